#![forbid(unsafe_code)]

//! SQLite-backed record store for `nset_core` forests.

mod store;

pub use store::*;

use nset_core::{NestedSet, TreeConfig};
use std::path::Path;

/// Opens (or creates) the store under `storage_dir` and wraps it in a tree
/// engine with the same configuration.
pub fn open_tree(storage_dir: impl AsRef<Path>, config: TreeConfig) -> Result<NestedSet<SqliteStore>, StoreError> {
    let store = SqliteStore::open(storage_dir, config.clone())?;
    Ok(NestedSet::new(store, config)?)
}
