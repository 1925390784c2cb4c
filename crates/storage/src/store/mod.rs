#![forbid(unsafe_code)]

mod error;
mod layout;
mod rows;
mod tx;

pub use error::StoreError;
pub use tx::SqliteTx;

use layout::{META_TABLE, TableLayout};
use nset_core::{Node, NodeId, NodeQuery, ScopeKey, TreeConfig, TreeRead, TreeStore};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const DB_FILE: &str = "nested_set.db";
const SCHEMA_VERSION: i64 = 1;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: Option<PathBuf>,
    layout: TableLayout,
    config: TreeConfig,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>, config: TreeConfig) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;

        let store = Self::with_connection(conn, Some(storage_dir), config)?;
        debug!(path = %db_path.display(), table = %store.config.table, "sqlite tree store opened");
        Ok(store)
    }

    pub fn open_in_memory(config: TreeConfig) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self::with_connection(conn, None, config)?;
        debug!(table = %store.config.table, "in-memory sqlite tree store opened");
        Ok(store)
    }

    fn with_connection(conn: Connection, storage_dir: Option<PathBuf>, config: TreeConfig) -> Result<Self, StoreError> {
        let layout = TableLayout::from_config(&config)?;
        preflight_gate(&conn, &layout)?;
        install_schema(&conn, &layout)?;
        Ok(Self {
            conn,
            storage_dir,
            layout,
            config,
        })
    }

    /// `None` for in-memory stores.
    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_dir.as_deref()
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }
}

impl TreeRead for SqliteStore {
    type Error = StoreError;

    fn load_node(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        rows::load_node(&self.conn, &self.layout, id)
    }

    fn find_nodes(&self, query: &NodeQuery) -> Result<Vec<Node>, StoreError> {
        rows::find_nodes(&self.conn, &self.layout, query)
    }

    fn count_nodes(&self, query: &NodeQuery) -> Result<u64, StoreError> {
        rows::count_nodes(&self.conn, &self.layout, query)
    }

    fn max_right(&self, scope: Option<&ScopeKey>) -> Result<i64, StoreError> {
        rows::max_right(&self.conn, &self.layout, scope)
    }
}

impl TreeStore for SqliteStore {
    type Tx<'a>
        = SqliteTx<'a>
    where
        Self: 'a;

    fn begin(&mut self) -> Result<SqliteTx<'_>, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteTx::new(tx, &self.layout))
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 COLLATE NOCASE",
            params![name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Refuses databases whose tree table was laid out differently, or that hold
/// a tree table this store never installed.
fn preflight_gate(conn: &Connection, layout: &TableLayout) -> Result<(), StoreError> {
    let has_tree = table_exists(conn, layout.table_name())?;
    let stored = if table_exists(conn, META_TABLE)? {
        conn.query_row(
            &format!("SELECT schema_version, columns FROM {META_TABLE} WHERE table_name=?1"),
            params![layout.table_name()],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?
    } else {
        None
    };

    match stored {
        None if has_tree => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: tree table exists without a recorded layout",
        )),
        None => Ok(()),
        Some((version, _)) if version != SCHEMA_VERSION => Err(StoreError::SchemaMismatch {
            expected: format!("schema_version={SCHEMA_VERSION}"),
            stored: format!("schema_version={version}"),
        }),
        Some((_, columns)) if columns != layout.fingerprint() => Err(StoreError::SchemaMismatch {
            expected: layout.fingerprint(),
            stored: columns,
        }),
        Some(_) if !has_tree => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: recorded tree table is missing",
        )),
        Some(_) => Ok(()),
    }
}

fn install_schema(conn: &Connection, layout: &TableLayout) -> Result<(), StoreError> {
    let now_ms = now_ms();

    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {META_TABLE} (
          table_name TEXT PRIMARY KEY,
          schema_version INTEGER NOT NULL,
          columns TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
        "#
    ))?;
    conn.execute_batch(&layout.create_sql())?;

    conn.execute(
        &format!(
            "INSERT INTO {META_TABLE}(table_name, schema_version, columns, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?4) \
             ON CONFLICT(table_name) DO UPDATE SET updated_at_ms=excluded.updated_at_ms"
        ),
        params![layout.table_name(), SCHEMA_VERSION, layout.fingerprint(), now_ms],
    )?;

    debug!(table = layout.table_name(), schema_version = SCHEMA_VERSION, "tree schema installed");
    Ok(())
}

fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
