//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the gallery core.
//! - Create the four gallery tables idempotently and verify their shape.
//!
//! # Invariants
//! - Foreign keys are enforced on every returned connection.
//! - Core code must not read/write gallery data before the schema check
//!   succeeds.
//! - Opening never drops or rewrites existing rows.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Required table is missing after schema bootstrap.
    MissingRequiredTable(&'static str),
    /// Required column is missing from an existing table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "gallery schema requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "gallery schema requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
