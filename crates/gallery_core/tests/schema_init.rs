use gallery_core::db::schema::REQUIRED_COLUMNS;
use gallery_core::db::{open_db, open_db_in_memory, DbError};
use gallery_core::{DataAccess, NewAlbum, NewUser, RepoError, SqliteDataAccess};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_all_tables() {
    let conn = open_db_in_memory().unwrap();

    for (table, _) in REQUIRED_COLUMNS {
        assert_table_exists(&conn, table);
    }
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn reopening_same_file_keeps_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Gallery.sqlite");

    let mut store = SqliteDataAccess::file(&path);
    store.open().unwrap();
    let alice = store.create_user(&NewUser::new("Alice")).unwrap();
    store
        .create_album(&NewAlbum::new("Trip", "2023-01-01", alice.id))
        .unwrap();
    store.close();

    let mut reopened = SqliteDataAccess::file(&path);
    reopened.open().unwrap();
    reopened.open().unwrap();
    assert!(reopened.does_user_exist(alice.id));
    assert!(reopened.does_album_exist("Trip", alice.id));
}

#[test]
fn foreign_keys_are_declared_between_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(foreign_targets(&conn, "ALBUMS"), vec!["USERS".to_string()]);
    assert_eq!(foreign_targets(&conn, "PICTURES"), vec!["ALBUMS".to_string()]);
    let mut tag_targets = foreign_targets(&conn, "TAGS");
    tag_targets.sort();
    assert_eq!(tag_targets, vec!["PICTURES".to_string(), "USERS".to_string()]);
}

#[test]
fn raw_insert_with_dangling_owner_is_rejected_by_store() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO ALBUMS (NAME, CREATION_DATE, USER_ID) VALUES ('Ghost', '2023-01-01', 99);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn opening_file_with_incompatible_table_reports_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.sqlite");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE PICTURES (ID INTEGER PRIMARY KEY, NAME TEXT, ALBUM_ID INTEGER);")
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::MissingRequiredColumn {
            table: "PICTURES",
            column: "LOCATION"
        }
    ));

    let mut store = SqliteDataAccess::file(&path);
    let err = store.open().unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::MissingRequiredColumn { .. })));
    assert!(!store.is_open());
}

#[test]
fn operations_before_open_report_not_open() {
    let mut store = SqliteDataAccess::in_memory();

    assert!(matches!(store.get_albums(), Err(RepoError::NotOpen)));
    assert!(matches!(
        store.create_user(&NewUser::new("Alice")),
        Err(RepoError::NotOpen)
    ));
    assert!(!store.does_user_exist(1));
}

#[test]
fn clear_removes_every_row() {
    let mut store = SqliteDataAccess::in_memory();
    store.open().unwrap();
    let alice = store.create_user(&NewUser::new("Alice")).unwrap();
    store
        .create_album(&NewAlbum::new("Trip", "2023-01-01", alice.id))
        .unwrap();

    store.clear().unwrap();

    let conn = store.connection().unwrap();
    for (table, _) in REQUIRED_COLUMNS {
        let rows: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(rows, 0, "table {table} should be empty");
    }
}

fn foreign_targets(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA foreign_key_list({table});"))
        .unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut targets = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let target: String = row.get(2).unwrap();
        targets.push(target);
    }
    targets
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
