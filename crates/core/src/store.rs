#![forbid(unsafe_code)]

//! What the tree needs from a record store.
//!
//! Reads go through [`TreeRead`]. Every write happens on a transaction handle
//! obtained from [`TreeStore::begin`]; dropping the handle without calling
//! [`TreeTx::commit`] must discard all of its writes.

use crate::ids::{NodeId, ScopeKey};
use crate::interval::{Attributes, Bounds, Node};
use crate::plan::ShiftPlan;
use crate::query::NodeQuery;

/// A node about to be inserted. The store assigns the id.
#[derive(Clone, Debug)]
pub struct NewNode {
    pub scope: Option<ScopeKey>,
    pub parent: Option<NodeId>,
    pub bounds: Bounds,
    pub attributes: Attributes,
}

pub trait TreeRead {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load_node(&self, id: NodeId) -> Result<Option<Node>, Self::Error>;

    /// Rows in `query.scope` matching every filter, in `query.order`.
    fn find_nodes(&self, query: &NodeQuery) -> Result<Vec<Node>, Self::Error>;

    fn count_nodes(&self, query: &NodeQuery) -> Result<u64, Self::Error>;

    /// Largest right boundary in the forest, 0 when it is empty.
    fn max_right(&self, scope: Option<&ScopeKey>) -> Result<i64, Self::Error>;
}

pub trait TreeWrite: TreeRead {
    fn insert_node(&mut self, node: NewNode) -> Result<Node, Self::Error>;

    fn write_attributes(&mut self, id: NodeId, attributes: &Attributes) -> Result<bool, Self::Error>;

    /// Applies `plan` to both boundary columns of every row in the forest.
    /// Returns the number of rows whose boundaries changed.
    fn apply_shift(&mut self, scope: Option<&ScopeKey>, plan: &ShiftPlan) -> Result<u64, Self::Error>;

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<bool, Self::Error>;

    fn delete_nodes(&mut self, query: &NodeQuery) -> Result<u64, Self::Error>;
}

pub trait TreeTx: TreeWrite {
    fn commit(self) -> Result<(), Self::Error>;
}

pub trait TreeStore: TreeRead {
    type Tx<'a>: TreeTx<Error = Self::Error>
    where
        Self: 'a;

    /// Opens an all-or-nothing unit of work holding the store's write lock.
    fn begin(&mut self) -> Result<Self::Tx<'_>, Self::Error>;
}
