#![forbid(unsafe_code)]

use super::StoreError;
use super::layout::TableLayout;
use super::rows;
use nset_core::{
    Attributes, NewNode, Node, NodeId, NodeQuery, ScopeKey, ShiftPlan, TreeRead, TreeTx, TreeWrite,
};
use rusqlite::Transaction;

/// A `BEGIN IMMEDIATE` transaction on the tree table. Dropping it rolls back.
pub struct SqliteTx<'a> {
    tx: Transaction<'a>,
    layout: &'a TableLayout,
}

impl<'a> SqliteTx<'a> {
    pub(crate) fn new(tx: Transaction<'a>, layout: &'a TableLayout) -> Self {
        Self { tx, layout }
    }
}

impl TreeRead for SqliteTx<'_> {
    type Error = StoreError;

    fn load_node(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        rows::load_node(&self.tx, self.layout, id)
    }

    fn find_nodes(&self, query: &NodeQuery) -> Result<Vec<Node>, StoreError> {
        rows::find_nodes(&self.tx, self.layout, query)
    }

    fn count_nodes(&self, query: &NodeQuery) -> Result<u64, StoreError> {
        rows::count_nodes(&self.tx, self.layout, query)
    }

    fn max_right(&self, scope: Option<&ScopeKey>) -> Result<i64, StoreError> {
        rows::max_right(&self.tx, self.layout, scope)
    }
}

impl TreeWrite for SqliteTx<'_> {
    fn insert_node(&mut self, node: NewNode) -> Result<Node, StoreError> {
        rows::insert_node_tx(&self.tx, self.layout, node)
    }

    fn write_attributes(&mut self, id: NodeId, attributes: &Attributes) -> Result<bool, StoreError> {
        rows::write_attributes_tx(&self.tx, self.layout, id, attributes)
    }

    fn apply_shift(&mut self, scope: Option<&ScopeKey>, plan: &ShiftPlan) -> Result<u64, StoreError> {
        rows::apply_shift_tx(&self.tx, self.layout, scope, plan)
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<bool, StoreError> {
        rows::set_parent_tx(&self.tx, self.layout, id, parent)
    }

    fn delete_nodes(&mut self, query: &NodeQuery) -> Result<u64, StoreError> {
        rows::delete_nodes_tx(&self.tx, self.layout, query)
    }
}

impl TreeTx for SqliteTx<'_> {
    fn commit(self) -> Result<(), StoreError> {
        Ok(self.tx.commit()?)
    }
}
