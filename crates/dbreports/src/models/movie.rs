/// Listing projection returned by title searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_year: String,
}

/// Aggregate projection used by the top-rated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRating {
    pub id: i64,
    pub title: String,
    pub release_year: String,
    pub num_reviews: i64,
    pub avg_rating: f64,
}

/// Full-detail projection assembled from the movie row and its satellite tables.
///
/// `tagline` is empty when the movie has none. `genres` and
/// `production_companies` are ordered by name.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub release_date: String,
    pub runtime: i64,
    pub original_language: String,
    pub budget: i64,
    pub revenue: i64,
    pub num_reviews: i64,
    pub avg_rating: f64,
    pub tagline: String,
    pub genres: Vec<String>,
    pub production_companies: Vec<String>,
}

impl MovieDetails {
    #[must_use]
    pub fn has_tagline(&self) -> bool {
        !self.tagline.is_empty()
    }
}

/// Result of one of the two write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Applied,
    /// Nothing to do, e.g. clearing a tagline that was never set.
    Unchanged,
    MovieNotFound,
    /// The movie exists but the statement affected no rows.
    NotApplied,
}

impl Mutation {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Applied | Self::Unchanged)
    }
}
