pub mod movie;
pub mod traffic;

pub use movie::{Movie, MovieDetails, MovieRating, Mutation};
pub use traffic::{
    Camera, CameraKind, DailyViolations, DateViolations, Intersection, IntersectionCameras,
    IntersectionTally, StreetCameras, TallyRow, TrafficOverview,
};
