//! Gallery schema creation and shape checks.
//!
//! # Invariants
//! - Creation is idempotent (`IF NOT EXISTS`) and never drops data.
//! - `REQUIRED_COLUMNS` lists every column the row mappers read.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables and the columns the data-access layer depends on.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("USERS", &["ID", "NAME"]),
    ("ALBUMS", &["ID", "NAME", "CREATION_DATE", "USER_ID"]),
    (
        "PICTURES",
        &["ID", "NAME", "LOCATION", "CREATION_DATE", "ALBUM_ID"],
    ),
    ("TAGS", &["ID", "PICTURE_ID", "USER_ID"]),
];

/// Creates the four gallery tables and their indexes when absent.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Verifies that every required table and column exists.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(DbError::MissingRequiredTable(table));
        }
        let present = table_columns(conn, table)?;
        for &column in columns {
            if !present.iter().any(|name| name.eq_ignore_ascii_case(column)) {
                return Err(DbError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

/// Deletes every gallery row, children first so foreign keys hold.
pub fn clear_all(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "DELETE FROM TAGS;
         DELETE FROM PICTURES;
         DELETE FROM ALBUMS;
         DELETE FROM USERS;",
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(1)?);
    }
    Ok(columns)
}
