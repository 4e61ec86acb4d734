//! Movie database operations.
//!
//! Every function is a fresh read (or a single write) against the store; no
//! results are cached between calls. Store failures propagate unchanged so
//! the caller can tell "no such movie" apart from "the query broke".

use rusqlite::types::{Type, ValueRef};
use rusqlite::{Row, params};

use crate::models::{Movie, MovieDetails, MovieRating, Mutation};
use crate::sqlite::{Store, StoreResult};
use crate::utils::time::truncate_to_date;

const COUNT_MOVIES_SQL: &str = "SELECT COUNT(*) FROM Movies";
const COUNT_REVIEWS_SQL: &str = "SELECT COUNT(*) FROM Ratings";

const FIND_MOVIES_SQL: &str = r#"
SELECT Movie_ID, Title, substr(Release_Date, 1, 4) AS Release_Year
FROM Movies
WHERE Title GLOB ?1
ORDER BY Movie_ID ASC
"#;

const MOVIE_CORE_SQL: &str = r#"
SELECT Movie_ID, Title, Release_Date, Runtime, Original_Language, Budget, Revenue
FROM Movies
WHERE Movie_ID = ?1
"#;

const MOVIE_REVIEW_STATS_SQL: &str =
    "SELECT COUNT(*), AVG(Rating) FROM Ratings WHERE Movie_ID = ?1";

const MOVIE_TAGLINE_SQL: &str = "SELECT Tagline FROM Movie_Taglines WHERE Movie_ID = ?1";

const MOVIE_GENRES_SQL: &str = r#"
SELECT G.Genre_Name
FROM Movie_Genres MG
JOIN Genres G ON MG.Genre_ID = G.Genre_ID
WHERE MG.Movie_ID = ?1
ORDER BY G.Genre_Name ASC
"#;

const MOVIE_COMPANIES_SQL: &str = r#"
SELECT C.Company_Name
FROM Movie_Production_Companies MPC
JOIN Companies C ON MPC.Company_ID = C.Company_ID
WHERE MPC.Movie_ID = ?1
ORDER BY C.Company_Name ASC
"#;

const TOP_MOVIES_SQL: &str = r#"
SELECT M.Movie_ID, M.Title, substr(M.Release_Date, 1, 4) AS Release_Year,
       COUNT(R.Rating) AS Num_Reviews, AVG(R.Rating) AS Avg_Rating
FROM Movies M
JOIN Ratings R ON M.Movie_ID = R.Movie_ID
GROUP BY M.Movie_ID
HAVING COUNT(R.Rating) >= ?1
ORDER BY Avg_Rating DESC, M.Title ASC
LIMIT ?2
"#;

const MOVIE_EXISTS_SQL: &str = "SELECT Movie_ID FROM Movies WHERE Movie_ID = ?1";
const INSERT_RATING_SQL: &str = "INSERT INTO Ratings (Movie_ID, Rating) VALUES (?1, ?2)";
const INSERT_TAGLINE_SQL: &str = "INSERT INTO Movie_Taglines (Movie_ID, Tagline) VALUES (?1, ?2)";
const UPDATE_TAGLINE_SQL: &str = "UPDATE Movie_Taglines SET Tagline = ?2 WHERE Movie_ID = ?1";
const DELETE_TAGLINE_SQL: &str = "DELETE FROM Movie_Taglines WHERE Movie_ID = ?1";

pub fn num_movies(store: &Store) -> StoreResult<i64> {
    count(store, COUNT_MOVIES_SQL)
}

pub fn num_reviews(store: &Store) -> StoreResult<i64> {
    count(store, COUNT_REVIEWS_SQL)
}

/// Movies whose title matches a `LIKE`-style pattern (`_` one character,
/// `%` any run), ordered by id. Unlike SQLite's `LIKE` the match is
/// case-sensitive.
pub fn get_movies(store: &Store, pattern: &str) -> StoreResult<Vec<Movie>> {
    let glob = like_to_glob(pattern);
    store.fetch_all(FIND_MOVIES_SQL, params![glob], |row| {
        Ok(Movie {
            id: row.get(0)?,
            title: text_or_empty(row, 1)?,
            release_year: text_or_empty(row, 2)?,
        })
    })
}

/// Full details for one movie, or `None` when no movie has that id.
pub fn get_movie_details(store: &Store, movie_id: i64) -> StoreResult<Option<MovieDetails>> {
    let Some(core) = store.fetch_one(MOVIE_CORE_SQL, params![movie_id], |row| {
        Ok(MovieCore {
            id: row.get(0)?,
            title: text_or_empty(row, 1)?,
            release_date: text_or_empty(row, 2)?,
            runtime: int_or_zero(row, 3)?,
            original_language: text_or_empty(row, 4)?,
            budget: int_or_zero(row, 5)?,
            revenue: int_or_zero(row, 6)?,
        })
    })?
    else {
        return Ok(None);
    };

    let (num_reviews, avg_rating) = store
        .fetch_one(MOVIE_REVIEW_STATS_SQL, params![movie_id], |row| {
            Ok((
                row.get::<usize, Option<i64>>(0)?.unwrap_or(0),
                row.get::<usize, Option<f64>>(1)?.unwrap_or(0.0),
            ))
        })?
        .unwrap_or((0, 0.0));

    let tagline = store
        .fetch_one(MOVIE_TAGLINE_SQL, params![movie_id], |row| {
            text_or_empty(row, 0)
        })?
        .unwrap_or_default();

    let genres = names(store, MOVIE_GENRES_SQL, movie_id)?;
    let production_companies = names(store, MOVIE_COMPANIES_SQL, movie_id)?;

    Ok(Some(MovieDetails {
        id: core.id,
        title: core.title,
        release_date: truncate_to_date(&core.release_date).to_string(),
        runtime: core.runtime,
        original_language: core.original_language,
        budget: core.budget,
        revenue: core.revenue,
        num_reviews,
        avg_rating,
        tagline,
        genres,
        production_companies,
    }))
}

/// Highest average ratings among movies with at least `min_num_reviews`
/// reviews. Ties on the average are broken by title.
pub fn get_top_n_movies(
    store: &Store,
    n: i64,
    min_num_reviews: i64,
) -> StoreResult<Vec<MovieRating>> {
    store.fetch_all(TOP_MOVIES_SQL, params![min_num_reviews, n], |row| {
        Ok(MovieRating {
            id: row.get(0)?,
            title: text_or_empty(row, 1)?,
            release_year: text_or_empty(row, 2)?,
            num_reviews: row.get(3)?,
            avg_rating: row.get(4)?,
        })
    })
}

/// Inserts one rating. The 0-10 range is the caller's responsibility.
pub fn add_review(store: &Store, movie_id: i64, rating: i64) -> StoreResult<Mutation> {
    if !movie_exists(store, movie_id)? {
        return Ok(Mutation::MovieNotFound);
    }

    let inserted = store.execute(INSERT_RATING_SQL, params![movie_id, rating])?;
    Ok(applied_if_changed(inserted))
}

/// Sets the tagline, or removes it when `tagline` is empty.
pub fn set_tagline(store: &Store, movie_id: i64, tagline: &str) -> StoreResult<Mutation> {
    if !movie_exists(store, movie_id)? {
        return Ok(Mutation::MovieNotFound);
    }

    let existing = store.fetch_one(MOVIE_TAGLINE_SQL, params![movie_id], |row| {
        text_or_empty(row, 0)
    })?;

    let changed = match (existing, tagline.is_empty()) {
        (Some(_), false) => store.execute(UPDATE_TAGLINE_SQL, params![movie_id, tagline])?,
        (Some(_), true) => store.execute(DELETE_TAGLINE_SQL, params![movie_id])?,
        (None, false) => store.execute(INSERT_TAGLINE_SQL, params![movie_id, tagline])?,
        (None, true) => return Ok(Mutation::Unchanged),
    };
    Ok(applied_if_changed(changed))
}

struct MovieCore {
    id: i64,
    title: String,
    release_date: String,
    runtime: i64,
    original_language: String,
    budget: i64,
    revenue: i64,
}

fn count(store: &Store, sql: &str) -> StoreResult<i64> {
    Ok(store
        .fetch_one(sql, [], |row| row.get::<usize, i64>(0))?
        .unwrap_or(0))
}

fn movie_exists(store: &Store, movie_id: i64) -> StoreResult<bool> {
    Ok(store
        .fetch_one(MOVIE_EXISTS_SQL, params![movie_id], |row| {
            row.get::<usize, i64>(0)
        })?
        .is_some())
}

fn names(store: &Store, sql: &str, movie_id: i64) -> StoreResult<Vec<String>> {
    store.fetch_all(sql, params![movie_id], |row| text_or_empty(row, 0))
}

// The movie exists but the statement touched nothing, e.g. the tagline row
// disappeared between the existence check and the update.
fn applied_if_changed(rows: usize) -> Mutation {
    if rows > 0 {
        Mutation::Applied
    } else {
        Mutation::NotApplied
    }
}

/// Rewrites `%`/`_` wildcards for `GLOB`, escaping the characters `GLOB`
/// treats specially so they match literally.
fn like_to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        match ch {
            '%' => glob.push('*'),
            '_' => glob.push('?'),
            '*' => glob.push_str("[*]"),
            '?' => glob.push_str("[?]"),
            '[' => glob.push_str("[[]"),
            other => glob.push(other),
        }
    }
    glob
}

// Column affinity is advisory in SQLite, so text and numeric columns are
// decoded from whatever storage class the row actually holds.
fn text_or_empty(row: &Row<'_>, index: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(index)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    })
}

/// Whole-number view of a numeric column: reals are truncated, numeric
/// text is parsed, NULL is 0.
fn int_or_zero(row: &Row<'_>, index: usize) -> rusqlite::Result<i64> {
    match row.get_ref(index)? {
        ValueRef::Null => Ok(0),
        ValueRef::Integer(value) => Ok(value),
        ValueRef::Real(value) => Ok(value.trunc() as i64),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            text.trim()
                .parse::<f64>()
                .map(|value| value.trunc() as i64)
                .map_err(|error| {
                    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
                })
        }
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            index,
            row.as_ref()
                .column_name(index)
                .map_or_else(|_| index.to_string(), str::to_string),
            Type::Blob,
        )),
    }
}
