#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use dbreports::sqlite::Store;
use rusqlite::Connection;

pub const MOVIES_SCHEMA: &str = r#"
CREATE TABLE Movies (
    Movie_ID INTEGER PRIMARY KEY,
    Title TEXT NOT NULL,
    Release_Date TEXT,
    Runtime INTEGER,
    Original_Language TEXT,
    Budget INTEGER,
    Revenue INTEGER
);
CREATE TABLE Ratings (
    Movie_ID INTEGER NOT NULL,
    Rating INTEGER NOT NULL
);
CREATE TABLE Movie_Taglines (
    Movie_ID INTEGER PRIMARY KEY,
    Tagline TEXT NOT NULL
);
CREATE TABLE Genres (
    Genre_ID INTEGER PRIMARY KEY,
    Genre_Name TEXT NOT NULL
);
CREATE TABLE Movie_Genres (
    Movie_ID INTEGER NOT NULL,
    Genre_ID INTEGER NOT NULL
);
CREATE TABLE Companies (
    Company_ID INTEGER PRIMARY KEY,
    Company_Name TEXT NOT NULL
);
CREATE TABLE Movie_Production_Companies (
    Movie_ID INTEGER NOT NULL,
    Company_ID INTEGER NOT NULL
);
"#;

pub const MOVIES_ROWS: &str = r#"
INSERT INTO Movies VALUES
    (1, 'The Matrix', '1999-03-30 00:00:00', 136, 'en', 63000000, 463517383),
    (2, 'The Matrix Reloaded', '2003-05-15', 138, 'en', 150000000, 738599701),
    (3, 'Toy Story', '1995-10-30', 81, 'en', 30000000, 373554033),
    (4, 'Amelie', '2001-04-25', NULL, 'fr', NULL, NULL),
    (5, 'Heat', '1995-12-15', 170, 'en', 60000000, 187436818);
INSERT INTO Ratings VALUES
    (1, 10), (1, 9), (1, 8),
    (2, 6), (2, 7),
    (3, 9), (3, 9), (3, 9),
    (5, 8);
INSERT INTO Movie_Taglines VALUES (1, 'Welcome to the Real World.');
INSERT INTO Genres VALUES
    (1, 'Action'), (2, 'Science Fiction'), (3, 'Animation'), (4, 'Comedy');
INSERT INTO Movie_Genres VALUES (1, 2), (1, 1), (3, 3), (3, 4);
INSERT INTO Companies VALUES
    (1, 'Warner Bros.'), (2, 'Village Roadshow Pictures'), (3, 'Pixar');
INSERT INTO Movie_Production_Companies VALUES (1, 1), (1, 2), (3, 3);
"#;

pub const TRAFFIC_SCHEMA: &str = r#"
CREATE TABLE Intersections (
    Intersection_ID INTEGER PRIMARY KEY,
    Intersection TEXT NOT NULL
);
CREATE TABLE RedCameras (
    Camera_ID INTEGER PRIMARY KEY,
    Intersection_ID INTEGER,
    Address TEXT,
    Latitude REAL,
    Longitude REAL
);
CREATE TABLE SpeedCameras (
    Camera_ID INTEGER PRIMARY KEY,
    Intersection_ID INTEGER,
    Address TEXT,
    Latitude REAL,
    Longitude REAL
);
CREATE TABLE RedViolations (
    Camera_ID INTEGER NOT NULL,
    Violation_Date TEXT NOT NULL,
    Num_Violations INTEGER NOT NULL
);
CREATE TABLE SpeedViolations (
    Camera_ID INTEGER NOT NULL,
    Violation_Date TEXT NOT NULL,
    Num_Violations INTEGER NOT NULL
);
"#;

pub const TRAFFIC_ROWS: &str = r#"
INSERT INTO Intersections VALUES
    (1, 'Pulaski & Archer'), (2, 'Western & 63rd'), (3, 'Halsted & 18th');
INSERT INTO RedCameras VALUES
    (1001, 1, '4000 S Pulaski Rd', 41.8, -87.72),
    (1002, 1, '4001 S Pulaski Rd', 41.81, -87.73),
    (1003, 2, '6300 S Western Ave', 41.78, -87.68);
INSERT INTO SpeedCameras VALUES
    (2001, 1, '3900 S Pulaski Rd', 41.82, -87.724),
    (2002, 3, '1800 S Halsted St', 41.86, -87.65);
INSERT INTO RedViolations VALUES
    (1001, '2021-06-01', 5),
    (1001, '2023-01-01', 3),
    (1001, '2023-02-15', 4),
    (1001, '2024-03-01', 20),
    (1002, '2023-01-01', 2),
    (1003, '2024-03-01', 10);
INSERT INTO SpeedViolations VALUES
    (2001, '2024-03-01', 70),
    (2001, '2024-12-31', 5),
    (2002, '2024-01-02', 8);
"#;

pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}-{nanos}"));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

pub fn seed_database(path: &Path, schema: &str, rows: &str) {
    let connection = Connection::open(path).expect("fixture database should open");
    connection
        .execute_batch(schema)
        .expect("fixture schema should apply");
    connection
        .execute_batch(rows)
        .expect("fixture rows should insert");
}

pub fn movies_db(prefix: &str) -> PathBuf {
    let path = unique_temp_dir(prefix).join("movies.db");
    seed_database(&path, MOVIES_SCHEMA, MOVIES_ROWS);
    path
}

pub fn traffic_db(prefix: &str) -> PathBuf {
    let path = unique_temp_dir(prefix).join("chicago-traffic-cameras.db");
    seed_database(&path, TRAFFIC_SCHEMA, TRAFFIC_ROWS);
    path
}

pub fn movies_store(prefix: &str) -> Store {
    Store::open(&movies_db(prefix)).expect("movies fixture should open")
}

pub fn traffic_store(prefix: &str) -> Store {
    Store::open(&traffic_db(prefix)).expect("traffic fixture should open")
}

/// Console output with the menu block removed and trailing whitespace
/// trimmed from every line, so transcripts only show what commands print.
pub fn transcript(output: Vec<u8>, menu: &[&str]) -> String {
    let text = String::from_utf8(output).expect("console output should be utf-8");
    text.lines()
        .filter(|line| !menu.contains(line))
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}
