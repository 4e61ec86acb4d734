//! Traffic camera queries.
//!
//! Red light and speed cameras live in parallel tables with identical shapes,
//! so most queries are written once and instantiated per [`CameraKind`].

use std::collections::BTreeMap;

use rusqlite::{Row, params};

use crate::models::{
    Camera, CameraKind, DailyViolations, DateViolations, Intersection, IntersectionCameras,
    IntersectionTally, StreetCameras, TallyRow, TrafficOverview,
};
use crate::sqlite::{Store, StoreResult};

const FIND_INTERSECTIONS_SQL: &str = r#"
SELECT Intersection_ID, Intersection
FROM Intersections
WHERE Intersection LIKE ?1
ORDER BY Intersection ASC
"#;

const INTERSECTION_BY_NAME_SQL: &str =
    "SELECT Intersection_ID, Intersection FROM Intersections WHERE Intersection = ?1";

pub fn overview(store: &Store) -> StoreResult<TrafficOverview> {
    let mut first_dates = Vec::new();
    let mut last_dates = Vec::new();
    for kind in CameraKind::ALL {
        let sql = format!(
            "SELECT MIN(Violation_Date), MAX(Violation_Date) FROM {}",
            kind.violation_table()
        );
        let bounds = store.fetch_one(&sql, [], |row| {
            Ok((
                row.get::<usize, Option<String>>(0)?,
                row.get::<usize, Option<String>>(1)?,
            ))
        })?;
        // An empty table yields (NULL, NULL) and contributes no bound.
        if let Some((first, last)) = bounds {
            first_dates.extend(first);
            last_dates.extend(last);
        }
    }

    Ok(TrafficOverview {
        red_cameras: count_rows(store, CameraKind::Red.camera_table())?,
        speed_cameras: count_rows(store, CameraKind::Speed.camera_table())?,
        red_violation_entries: count_rows(store, CameraKind::Red.violation_table())?,
        speed_violation_entries: count_rows(store, CameraKind::Speed.violation_table())?,
        first_violation_date: first_dates.into_iter().min(),
        last_violation_date: last_dates.into_iter().max(),
        red_violations_total: violation_sum(store, CameraKind::Red)?,
        speed_violations_total: violation_sum(store, CameraKind::Speed)?,
    })
}

/// Intersections whose name matches a SQL `LIKE` pattern, alphabetically.
pub fn find_intersections(store: &Store, pattern: &str) -> StoreResult<Vec<Intersection>> {
    store.fetch_all(FIND_INTERSECTIONS_SQL, params![pattern], intersection_from_row)
}

/// Cameras at the intersection with exactly this name, or `None` when the
/// intersection is unknown.
pub fn cameras_at_intersection(
    store: &Store,
    name: &str,
) -> StoreResult<Option<IntersectionCameras>> {
    let Some(intersection) =
        store.fetch_one(INTERSECTION_BY_NAME_SQL, params![name], intersection_from_row)?
    else {
        return Ok(None);
    };

    let red = cameras_at(store, CameraKind::Red, intersection.id)?;
    let speed = cameras_at(store, CameraKind::Speed, intersection.id)?;

    Ok(Some(IntersectionCameras {
        intersection,
        red,
        speed,
    }))
}

pub fn violations_on_date(store: &Store, date: &str) -> StoreResult<DateViolations> {
    Ok(DateViolations {
        red: sum_on_date(store, CameraKind::Red, date)?,
        speed: sum_on_date(store, CameraKind::Speed, date)?,
    })
}

/// Number of cameras of one kind per intersection, largest first, measured
/// against the citywide camera count of that kind.
pub fn cameras_per_intersection(store: &Store, kind: CameraKind) -> StoreResult<IntersectionTally> {
    let sql = format!(
        r#"
SELECT I.Intersection, I.Intersection_ID, COUNT(C.Camera_ID) AS Camera_Count
FROM Intersections I
JOIN {cameras} C ON I.Intersection_ID = C.Intersection_ID
GROUP BY I.Intersection_ID
ORDER BY Camera_Count DESC, I.Intersection_ID DESC
"#,
        cameras = kind.camera_table()
    );

    Ok(IntersectionTally {
        total: count_rows(store, kind.camera_table())?,
        rows: store.fetch_all(&sql, [], tally_row_from_row)?,
    })
}

/// Violations of one kind per intersection during `year`, largest first,
/// measured against that year's citywide total for the kind.
pub fn violations_per_intersection(
    store: &Store,
    kind: CameraKind,
    year: &str,
) -> StoreResult<IntersectionTally> {
    let rows_sql = format!(
        r#"
SELECT I.Intersection, I.Intersection_ID, SUM(V.Num_Violations) AS Violation_Total
FROM {violations} V
JOIN {cameras} C ON V.Camera_ID = C.Camera_ID
JOIN Intersections I ON C.Intersection_ID = I.Intersection_ID
WHERE strftime('%Y', V.Violation_Date) = ?1
GROUP BY I.Intersection_ID
ORDER BY Violation_Total DESC, I.Intersection_ID DESC
"#,
        violations = kind.violation_table(),
        cameras = kind.camera_table()
    );
    let total_sql = format!(
        "SELECT SUM(Num_Violations) FROM {} WHERE strftime('%Y', Violation_Date) = ?1",
        kind.violation_table()
    );

    let rows = store.fetch_all(&rows_sql, params![year], tally_row_from_row)?;
    let total = store
        .fetch_one(&total_sql, params![year], |row| {
            row.get::<usize, Option<i64>>(0)
        })?
        .flatten()
        .unwrap_or(0);

    Ok(IntersectionTally { total, rows })
}

/// Which camera tables contain `camera_id`. Empty means the camera is unknown.
pub fn camera_kinds(store: &Store, camera_id: i64) -> StoreResult<Vec<CameraKind>> {
    let mut kinds = Vec::new();
    for kind in CameraKind::ALL {
        let sql = format!("SELECT 1 FROM {} WHERE Camera_ID = ?1", kind.camera_table());
        if store
            .fetch_one(&sql, params![camera_id], |row| row.get::<usize, i64>(0))?
            .is_some()
        {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Violation totals per year for one camera, summed across `kinds`.
pub fn yearly_violations(
    store: &Store,
    camera_id: i64,
    kinds: &[CameraKind],
) -> StoreResult<BTreeMap<i32, i64>> {
    let mut totals = BTreeMap::new();
    for kind in kinds {
        let sql = format!(
            r#"
SELECT CAST(strftime('%Y', Violation_Date) AS INTEGER) AS Violation_Year, SUM(Num_Violations)
FROM {}
WHERE Camera_ID = ?1
GROUP BY Violation_Year
"#,
            kind.violation_table()
        );
        for (year, count) in buckets(store.fetch_all(
            &sql,
            params![camera_id],
            bucket_from_row::<i32>,
        )?) {
            *totals.entry(year).or_insert(0) += count;
        }
    }
    Ok(totals)
}

/// Violation totals per month (1-12) of `year` for one camera, summed
/// across `kinds`. Months without violations are absent.
pub fn monthly_violations(
    store: &Store,
    camera_id: i64,
    kinds: &[CameraKind],
    year: &str,
) -> StoreResult<BTreeMap<u8, i64>> {
    let mut totals = BTreeMap::new();
    for kind in kinds {
        let sql = format!(
            r#"
SELECT CAST(strftime('%m', Violation_Date) AS INTEGER) AS Violation_Month, SUM(Num_Violations)
FROM {}
WHERE Camera_ID = ?1
  AND strftime('%Y', Violation_Date) = ?2
GROUP BY Violation_Month
"#,
            kind.violation_table()
        );
        for (month, count) in buckets(store.fetch_all(
            &sql,
            params![camera_id, year],
            bucket_from_row::<u8>,
        )?) {
            *totals.entry(month).or_insert(0) += count;
        }
    }
    Ok(totals)
}

/// Citywide red light and speed totals for every date of `year` that has
/// at least one entry, keyed by ISO date.
pub fn daily_violations(
    store: &Store,
    year: &str,
) -> StoreResult<BTreeMap<String, DailyViolations>> {
    let mut days: BTreeMap<String, DailyViolations> = BTreeMap::new();
    for kind in CameraKind::ALL {
        let sql = format!(
            r#"
SELECT Violation_Date, SUM(Num_Violations)
FROM {}
WHERE strftime('%Y', Violation_Date) = ?1
GROUP BY Violation_Date
"#,
            kind.violation_table()
        );
        for (date, count) in buckets(store.fetch_all(
            &sql,
            params![year],
            bucket_from_row::<String>,
        )?) {
            let entry = days.entry(date).or_default();
            match kind {
                CameraKind::Red => entry.red = count,
                CameraKind::Speed => entry.speed = count,
            }
        }
    }
    Ok(days)
}

/// Cameras whose address contains `street`, each kind ordered by camera id.
pub fn cameras_on_street(store: &Store, street: &str) -> StoreResult<StreetCameras> {
    let pattern = format!("%{street}%");
    let mut found = StreetCameras::default();
    for kind in CameraKind::ALL {
        let sql = format!(
            "SELECT {CAMERA_COLUMNS} FROM {} WHERE Address LIKE ?1 ORDER BY Camera_ID ASC",
            kind.camera_table()
        );
        let cameras = store.fetch_all(&sql, params![pattern], |row| camera_from_row(kind, row))?;
        match kind {
            CameraKind::Red => found.red = cameras,
            CameraKind::Speed => found.speed = cameras,
        }
    }
    Ok(found)
}

const CAMERA_COLUMNS: &str = "Camera_ID, Address, Latitude, Longitude, Intersection_ID";

fn cameras_at(store: &Store, kind: CameraKind, intersection_id: i64) -> StoreResult<Vec<Camera>> {
    let sql = format!(
        "SELECT {CAMERA_COLUMNS} FROM {} WHERE Intersection_ID = ?1 ORDER BY Camera_ID ASC",
        kind.camera_table()
    );
    store.fetch_all(&sql, params![intersection_id], |row| camera_from_row(kind, row))
}

fn camera_from_row(kind: CameraKind, row: &Row<'_>) -> rusqlite::Result<Camera> {
    Ok(Camera {
        kind,
        id: row.get(0)?,
        address: row.get::<usize, Option<String>>(1)?.unwrap_or_default(),
        latitude: row.get::<usize, Option<f64>>(2)?.unwrap_or(0.0),
        longitude: row.get::<usize, Option<f64>>(3)?.unwrap_or(0.0),
        intersection_id: row.get::<usize, Option<i64>>(4)?.unwrap_or(0),
    })
}

fn intersection_from_row(row: &Row<'_>) -> rusqlite::Result<Intersection> {
    Ok(Intersection {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn tally_row_from_row(row: &Row<'_>) -> rusqlite::Result<TallyRow> {
    Ok(TallyRow {
        intersection_name: row.get(0)?,
        intersection_id: row.get(1)?,
        count: row.get(2)?,
    })
}

fn bucket_from_row<K: rusqlite::types::FromSql>(
    row: &Row<'_>,
) -> rusqlite::Result<(Option<K>, i64)> {
    Ok((row.get(0)?, row.get::<usize, Option<i64>>(1)?.unwrap_or(0)))
}

// Dates strftime cannot parse produce a NULL bucket; those rows are skipped.
fn buckets<K>(rows: Vec<(Option<K>, i64)>) -> impl Iterator<Item = (K, i64)> {
    rows.into_iter()
        .filter_map(|(bucket, count)| bucket.map(|bucket| (bucket, count)))
}

fn count_rows(store: &Store, table: &str) -> StoreResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    Ok(store
        .fetch_one(&sql, [], |row| row.get::<usize, i64>(0))?
        .unwrap_or(0))
}

fn violation_sum(store: &Store, kind: CameraKind) -> StoreResult<Option<i64>> {
    let sql = format!("SELECT SUM(Num_Violations) FROM {}", kind.violation_table());
    Ok(store
        .fetch_one(&sql, [], |row| row.get::<usize, Option<i64>>(0))?
        .flatten())
}

fn sum_on_date(store: &Store, kind: CameraKind, date: &str) -> StoreResult<i64> {
    let sql = format!(
        "SELECT SUM(Num_Violations) FROM {} WHERE Violation_Date = ?1",
        kind.violation_table()
    );
    Ok(store
        .fetch_one(&sql, params![date], |row| row.get::<usize, Option<i64>>(0))?
        .flatten()
        .unwrap_or(0))
}
