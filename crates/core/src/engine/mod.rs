#![forbid(unsafe_code)]

//! `NestedSet` binds a store to a tree configuration and exposes the shape
//! queries (`query.rs`) and the structural mutations (`mutate.rs`).

mod mutate;
mod query;

pub use mutate::DeleteReport;

use crate::config::{ConfigError, TreeConfig};
use crate::error::TreeError;
use crate::ids::ScopeKey;

#[derive(Debug)]
pub struct NestedSet<S> {
    store: S,
    config: TreeConfig,
}

impl<S> NestedSet<S> {
    pub fn new(store: S, config: TreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn check_scope(&self, scope: Option<&ScopeKey>) -> Result<(), TreeError> {
        if scope.is_some() && !self.config.is_scoped() {
            return Err(TreeError::ScopeNotConfigured);
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests;
