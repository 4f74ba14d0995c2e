//! Repository layer: document-store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define data-access contracts for walls and wall items.
//! - Isolate SQL and document (de)serialization from service orchestration.
//!
//! # Invariants
//! - Point reads return `Ok(None)` for missing rows; mutations of missing
//!   rows return `NotFound`.
//! - Store failures surface as errors on reads and writes alike; no read
//!   path degrades to an empty result.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::field::ItemId;
use crate::model::wall::WallId;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod item_repo;
pub mod wall_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from wall/item persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Document column does not (de)serialize.
    Document(serde_json::Error),
    WallNotFound(WallId),
    ItemNotFound(ItemId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing from the connection schema.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "document (de)serialization failed: {err}"),
            Self::WallNotFound(id) => write!(f, "wall not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Document(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Document(value)
    }
}

/// Guards repository construction against unmigrated connections.
pub(crate) fn ensure_ready(
    conn: &Connection,
    required_tables: &[&'static str],
) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in required_tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}
