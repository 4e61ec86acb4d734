#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CameraKind {
    Red,
    Speed,
}

impl CameraKind {
    pub const ALL: [Self; 2] = [Self::Red, Self::Speed];

    #[must_use]
    pub const fn camera_table(self) -> &'static str {
        match self {
            Self::Red => "RedCameras",
            Self::Speed => "SpeedCameras",
        }
    }

    #[must_use]
    pub const fn violation_table(self) -> &'static str {
        match self {
            Self::Red => "RedViolations",
            Self::Speed => "SpeedViolations",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "Red Light",
            Self::Speed => "Speed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intersection {
    pub id: i64,
    pub name: String,
}

/// One installed camera, red light or speed.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub kind: CameraKind,
    pub id: i64,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub intersection_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionCameras {
    pub intersection: Intersection,
    pub red: Vec<Camera>,
    pub speed: Vec<Camera>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreetCameras {
    pub red: Vec<Camera>,
    pub speed: Vec<Camera>,
}

impl StreetCameras {
    #[must_use]
    pub fn len(&self) -> usize {
        self.red.len() + self.speed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Citywide figures shown when the traffic app starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrafficOverview {
    pub red_cameras: i64,
    pub speed_cameras: i64,
    pub red_violation_entries: i64,
    pub speed_violation_entries: i64,
    pub first_violation_date: Option<String>,
    pub last_violation_date: Option<String>,
    pub red_violations_total: Option<i64>,
    pub speed_violations_total: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateViolations {
    pub red: i64,
    pub speed: i64,
}

impl DateViolations {
    #[must_use]
    pub const fn total(self) -> i64 {
        self.red + self.speed
    }

    #[must_use]
    pub fn red_percent(self) -> f64 {
        percent_of(self.red, self.total())
    }

    #[must_use]
    pub fn speed_percent(self) -> f64 {
        percent_of(self.speed, self.total())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyRow {
    pub intersection_name: String,
    pub intersection_id: i64,
    pub count: i64,
}

/// Per-intersection counts plus the citywide total they are measured against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntersectionTally {
    pub total: i64,
    pub rows: Vec<TallyRow>,
}

impl IntersectionTally {
    #[must_use]
    pub fn percent(&self, count: i64) -> f64 {
        percent_of(count, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DailyViolations {
    pub red: i64,
    pub speed: i64,
}

impl DailyViolations {
    #[must_use]
    pub const fn count(self, kind: CameraKind) -> i64 {
        match kind {
            CameraKind::Red => self.red,
            CameraKind::Speed => self.speed,
        }
    }
}

// A zero or negative total yields 0.0 rather than NaN/inf.
fn percent_of(count: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::{CameraKind, DateViolations, IntersectionTally};

    #[test]
    fn date_split_percentages_sum_to_hundred() {
        let split = DateViolations { red: 30, speed: 70 };

        assert_eq!(split.total(), 100);
        assert!((split.red_percent() - 30.0).abs() < 1e-9);
        assert!((split.speed_percent() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_percent_is_guarded() {
        let tally = IntersectionTally {
            total: 0,
            rows: Vec::new(),
        };

        assert_eq!(tally.percent(5), 0.0);
        assert_eq!(DateViolations::default().red_percent(), 0.0);
    }

    #[test]
    fn camera_kinds_name_their_tables() {
        assert_eq!(CameraKind::Red.camera_table(), "RedCameras");
        assert_eq!(CameraKind::Speed.violation_table(), "SpeedViolations");
        assert_eq!(CameraKind::Speed.label(), "Speed");
    }
}
