use nset_core::{Attributes, ColumnName, TreeConfig, TreeRead};
use nset_storage::{SqliteStore, StoreError, open_tree};
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_storage_dir(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic enough for tests")
        .as_nanos();
    path.push(format!("nset-schema-{label}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&path).expect("temp storage dir must be creatable");
    path
}

#[test]
fn open_records_schema_version_and_layout() {
    let dir = temp_storage_dir("meta");
    let store = SqliteStore::open(&dir, TreeConfig::default()).expect("open");
    assert_eq!(store.storage_dir(), Some(dir.as_path()));
    assert_eq!(store.max_right(None).unwrap(), 0);
    drop(store);

    let conn = Connection::open(dir.join("nested_set.db")).unwrap();
    let (version, columns): (i64, String) = conn
        .query_row(
            "SELECT schema_version, columns FROM nested_set_meta WHERE table_name='nodes'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("meta row");
    assert_eq!(version, 1);
    assert!(columns.contains("left=\"lft\""));

    let journal: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(journal.to_ascii_lowercase(), "wal");
}

#[test]
fn reopen_with_a_different_layout_is_rejected() {
    let dir = temp_storage_dir("layout-mismatch");
    let mut tree = open_tree(&dir, TreeConfig::default()).expect("open");
    tree.create(None, Attributes::new()).unwrap();
    drop(tree);

    let mut renamed = TreeConfig::default();
    renamed.left_column = ColumnName::try_new("left_value").unwrap();
    let err = SqliteStore::open(&dir, renamed).expect_err("layout changed");
    assert_eq!(err.code(), "RESET_REQUIRED");
    assert!(matches!(err, StoreError::SchemaMismatch { .. }));

    let err = SqliteStore::open(&dir, TreeConfig::unscoped()).expect_err("scope column dropped");
    assert!(matches!(err, StoreError::SchemaMismatch { .. }));

    SqliteStore::open(&dir, TreeConfig::default()).expect("original layout still opens");
}

#[test]
fn stale_schema_version_is_rejected() {
    let dir = temp_storage_dir("version");
    drop(SqliteStore::open(&dir, TreeConfig::default()).expect("open"));

    let conn = Connection::open(dir.join("nested_set.db")).unwrap();
    conn.execute("UPDATE nested_set_meta SET schema_version=0", [])
        .unwrap();
    drop(conn);

    let err = SqliteStore::open(&dir, TreeConfig::default()).expect_err("old schema");
    match err {
        StoreError::SchemaMismatch { expected, stored } => {
            assert_eq!(expected, "schema_version=1");
            assert_eq!(stored, "schema_version=0");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn foreign_tree_table_is_fail_closed() {
    let dir = temp_storage_dir("foreign");
    let conn = Connection::open(dir.join("nested_set.db")).unwrap();
    conn.execute("CREATE TABLE nodes(id INTEGER PRIMARY KEY, name TEXT)", [])
        .unwrap();
    drop(conn);

    let err = SqliteStore::open(&dir, TreeConfig::default()).expect_err("unknown table");
    assert!(matches!(
        err,
        StoreError::InvalidInput(message) if message.starts_with("RESET_REQUIRED")
    ));
}

#[test]
fn two_tree_tables_share_one_database() {
    let dir = temp_storage_dir("two-tables");
    let mut menus = TreeConfig::default();
    menus.table = ColumnName::try_new("menus").unwrap();

    let mut nodes = open_tree(&dir, TreeConfig::default()).expect("nodes");
    nodes.create(None, Attributes::new()).unwrap();
    drop(nodes);

    let mut menu_tree = open_tree(&dir, menus).expect("menus");
    let first = menu_tree.create(None, Attributes::new()).unwrap();
    assert_eq!((first.left(), first.right()), (1, 2));
}

#[test]
fn invalid_configs_are_rejected_at_open() {
    let dir = temp_storage_dir("invalid-config");
    let mut config = TreeConfig::default();
    config.right_column = ColumnName::try_new("LFT").unwrap();

    let err = SqliteStore::open(&dir, config).expect_err("duplicate column");
    assert_eq!(err.code(), "INVALID_CONFIG");

    let mut config = TreeConfig::default();
    config.table = ColumnName::try_new("sqlite_nodes").unwrap();
    let err = SqliteStore::open_in_memory(config).expect_err("reserved table");
    assert_eq!(err.code(), "INVALID_INPUT");
}
