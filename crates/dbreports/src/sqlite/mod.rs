use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, OptionalExtension, Params, Row};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{operation} failed: {source}")]
    Execution {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Open { .. } => None,
            Self::Execution { operation, .. } => Some(operation),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Single long-lived connection to a report database.
///
/// Reads come back as `Ok(None)` / empty vectors when nothing matched and as
/// `Err(StoreError::Execution)` when the statement itself failed. Writes run
/// in autocommit mode, so each `execute` is durable once it returns.
#[derive(Debug)]
pub struct Store {
    connection: Connection,
}

impl Store {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection =
            Connection::open_with_flags(path, flags).map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "opened report database");
        Ok(Self { connection })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let connection = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Ok(Self { connection })
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn fetch_one<T, P, F>(&self, sql: &str, params: P, map: F) -> StoreResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.connection
            .query_row(sql, params, map)
            .optional()
            .map_err(|source| execution_failure("fetch_one", sql, source))
    }

    pub fn fetch_all<T, P, F>(&self, sql: &str, params: P, map: F) -> StoreResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut statement = self
            .connection
            .prepare(sql)
            .map_err(|source| execution_failure("fetch_all", sql, source))?;
        let rows = statement
            .query_map(params, map)
            .and_then(|mapped| mapped.collect::<rusqlite::Result<Vec<T>>>())
            .map_err(|source| execution_failure("fetch_all", sql, source))?;
        Ok(rows)
    }

    pub fn execute<P: Params>(&self, sql: &str, params: P) -> StoreResult<usize> {
        self.connection
            .execute(sql, params)
            .map_err(|source| execution_failure("execute", sql, source))
    }
}

fn execution_failure(operation: &'static str, sql: &str, source: rusqlite::Error) -> StoreError {
    tracing::warn!(operation, sql = sql.trim(), error = %source, "store statement failed");
    StoreError::Execution { operation, source }
}
