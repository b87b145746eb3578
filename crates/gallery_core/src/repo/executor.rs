//! Statement execution and typed row mapping.
//!
//! # Responsibility
//! - Run parameterized SQL against a borrowed connection or transaction.
//! - Decode rows into records through a declarative column binding.
//!
//! # Invariants
//! - Every call builds and returns its own collection; nothing is cached
//!   between calls.
//! - `FromRow::COLUMNS` order is the decode order used by `from_row`.

use crate::model::album::Album;
use crate::model::picture::Picture;
use crate::model::tag::Tag;
use crate::model::user::User;
use crate::repo::data_access::{RepoError, RepoResult};
use log::{debug, warn};
use rusqlite::{Connection, Params, Row};
use std::time::Instant;

/// Declarative binding between one table and one record type.
pub trait FromRow: Sized {
    const TABLE: &'static str;
    /// Projected columns, in the order `from_row` reads them.
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Renders `T::COLUMNS` qualified by a table alias, e.g. `a.ID, a.NAME`.
pub fn select_columns<T: FromRow>(alias: &str) -> String {
    T::COLUMNS
        .iter()
        .map(|column| format!("{alias}.{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders `SELECT <columns> FROM <table> <alias>` for `T`.
pub fn select_from<T: FromRow>(alias: &str) -> String {
    format!("SELECT {} FROM {} {alias}", select_columns::<T>(alias), T::TABLE)
}

impl FromRow for User {
    const TABLE: &'static str = "USERS";
    const COLUMNS: &'static [&'static str] = &["ID", "NAME"];

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

impl FromRow for Album {
    const TABLE: &'static str = "ALBUMS";
    const COLUMNS: &'static [&'static str] = &["ID", "NAME", "CREATION_DATE", "USER_ID"];

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            creation_date: row.get(2)?,
            owner_id: row.get(3)?,
        })
    }
}

impl FromRow for Picture {
    const TABLE: &'static str = "PICTURES";
    const COLUMNS: &'static [&'static str] =
        &["ID", "NAME", "LOCATION", "CREATION_DATE", "ALBUM_ID"];

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            path: row.get(2)?,
            creation_date: row.get(3)?,
            album_id: row.get(4)?,
        })
    }
}

impl FromRow for Tag {
    const TABLE: &'static str = "TAGS";
    const COLUMNS: &'static [&'static str] = &["ID", "PICTURE_ID", "USER_ID"];

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            picture_id: row.get(1)?,
            user_id: row.get(2)?,
        })
    }
}

/// Runs statements against one connection.
///
/// Accepts a `Transaction` as well, through deref to `Connection`.
pub struct QueryExecutor<'conn> {
    conn: &'conn Connection,
}

impl<'conn> QueryExecutor<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Runs a query and decodes every row into `T`.
    pub fn fetch_all<T: FromRow, P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<T>> {
        let started_at = Instant::now();
        let result = self.collect_rows(sql, params);
        log_outcome("fetch_all", T::TABLE, started_at, &result, |rows| rows.len());
        result
    }

    /// Runs a query and decodes the first row, if any.
    pub fn fetch_optional<T: FromRow, P: Params>(
        &self,
        sql: &str,
        params: P,
    ) -> RepoResult<Option<T>> {
        let started_at = Instant::now();
        let result = self.first_row(sql, params);
        log_outcome("fetch_optional", T::TABLE, started_at, &result, |row| {
            usize::from(row.is_some())
        });
        result
    }

    /// Runs a single-value `SELECT COUNT(...)` style query.
    pub fn fetch_count<P: Params>(&self, sql: &str, params: P) -> RepoResult<u64> {
        let started_at = Instant::now();
        let result = self
            .conn
            .query_row(sql, params, |row| row.get::<_, i64>(0))
            .map_err(RepoError::from)
            .and_then(|count| {
                u64::try_from(count)
                    .map_err(|_| RepoError::InvalidData(format!("negative count `{count}`")))
            });
        log_outcome("fetch_count", "-", started_at, &result, |_| 1);
        result
    }

    /// Runs a single-value `SELECT EXISTS(...)` query.
    pub fn fetch_exists<P: Params>(&self, sql: &str, params: P) -> RepoResult<bool> {
        Ok(self.fetch_count(sql, params)? > 0)
    }

    /// Runs a write statement and returns the number of changed rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> RepoResult<usize> {
        let started_at = Instant::now();
        let result = self.conn.execute(sql, params).map_err(RepoError::from);
        log_outcome("execute", "-", started_at, &result, |changed| *changed);
        result
    }

    /// Row id assigned by the most recent successful insert.
    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn collect_rows<T: FromRow, P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(T::from_row(row)?);
        }
        Ok(records)
    }

    fn first_row<T: FromRow, P: Params>(&self, sql: &str, params: P) -> RepoResult<Option<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => Ok(Some(T::from_row(row)?)),
            None => Ok(None),
        }
    }
}

fn log_outcome<T>(
    op: &str,
    table: &str,
    started_at: Instant,
    result: &RepoResult<T>,
    rows: impl FnOnce(&T) -> usize,
) {
    match result {
        Ok(value) => debug!(
            "event=query_run module=repo status=ok op={op} table={table} rows={} duration_ms={}",
            rows(value),
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event=query_run module=repo status=error op={op} table={table} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
