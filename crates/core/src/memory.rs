#![forbid(unsafe_code)]

//! A store that keeps every forest in a `BTreeMap`.
//!
//! Transactions stage a full copy of the map and swap it in on commit, so a
//! dropped transaction leaves nothing behind.

use crate::ids::{NodeId, ScopeKey};
use crate::interval::{Attributes, Node, NodeRow};
use crate::plan::ShiftPlan;
use crate::query::{NodeQuery, SortOrder};
use crate::store::{NewNode, TreeRead, TreeStore, TreeTx, TreeWrite};
use std::collections::BTreeMap;

#[derive(Debug)]
pub enum MemoryStoreError {
    /// Raised by [`MemoryStore::fail_after_writes`].
    InjectedFailure { write: usize },
}

impl std::fmt::Display for MemoryStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InjectedFailure { write } => write!(f, "injected failure on write #{write}"),
        }
    }
}

impl std::error::Error for MemoryStoreError {}

#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: BTreeMap<NodeId, Node>,
    next_id: i64,
    fail_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node of every forest, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Makes the next transaction fail once it has performed `writes` writes.
    pub fn fail_after_writes(&mut self, writes: usize) {
        self.fail_after = Some(writes);
    }
}

impl TreeRead for MemoryStore {
    type Error = MemoryStoreError;

    fn load_node(&self, id: NodeId) -> Result<Option<Node>, Self::Error> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn find_nodes(&self, query: &NodeQuery) -> Result<Vec<Node>, Self::Error> {
        Ok(select(&self.nodes, query))
    }

    fn count_nodes(&self, query: &NodeQuery) -> Result<u64, Self::Error> {
        Ok(count(&self.nodes, query))
    }

    fn max_right(&self, scope: Option<&ScopeKey>) -> Result<i64, Self::Error> {
        Ok(max_right(&self.nodes, scope))
    }
}

impl TreeStore for MemoryStore {
    type Tx<'a> = MemoryTx<'a>;

    fn begin(&mut self) -> Result<Self::Tx<'_>, Self::Error> {
        let nodes = self.nodes.clone();
        let next_id = self.next_id;
        let fail_after = self.fail_after.take();
        Ok(MemoryTx {
            store: self,
            nodes,
            next_id,
            writes: 0,
            fail_after,
        })
    }
}

#[derive(Debug)]
pub struct MemoryTx<'a> {
    store: &'a mut MemoryStore,
    nodes: BTreeMap<NodeId, Node>,
    next_id: i64,
    writes: usize,
    fail_after: Option<usize>,
}

impl MemoryTx<'_> {
    fn record_write(&mut self) -> Result<(), MemoryStoreError> {
        self.writes += 1;
        match self.fail_after {
            Some(limit) if self.writes > limit => {
                Err(MemoryStoreError::InjectedFailure { write: self.writes })
            }
            _ => Ok(()),
        }
    }
}

impl TreeRead for MemoryTx<'_> {
    type Error = MemoryStoreError;

    fn load_node(&self, id: NodeId) -> Result<Option<Node>, Self::Error> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn find_nodes(&self, query: &NodeQuery) -> Result<Vec<Node>, Self::Error> {
        Ok(select(&self.nodes, query))
    }

    fn count_nodes(&self, query: &NodeQuery) -> Result<u64, Self::Error> {
        Ok(count(&self.nodes, query))
    }

    fn max_right(&self, scope: Option<&ScopeKey>) -> Result<i64, Self::Error> {
        Ok(max_right(&self.nodes, scope))
    }
}

impl TreeWrite for MemoryTx<'_> {
    fn insert_node(&mut self, node: NewNode) -> Result<Node, Self::Error> {
        self.record_write()?;
        self.next_id += 1;
        let inserted = Node::from(NodeRow {
            id: NodeId::new(self.next_id),
            scope: node.scope,
            parent: node.parent,
            bounds: node.bounds,
            attributes: node.attributes,
        });
        self.nodes.insert(inserted.id(), inserted.clone());
        Ok(inserted)
    }

    fn write_attributes(&mut self, id: NodeId, attributes: &Attributes) -> Result<bool, Self::Error> {
        self.record_write()?;
        let Some(node) = self.nodes.get_mut(&id) else {
            return Ok(false);
        };
        *node.attributes_mut() = attributes.clone();
        Ok(true)
    }

    fn apply_shift(&mut self, scope: Option<&ScopeKey>, plan: &ShiftPlan) -> Result<u64, Self::Error> {
        self.record_write()?;
        let mut changed = 0;
        for node in self.nodes.values_mut() {
            if node.scope() != scope || !plan.touches(node.bounds()) {
                continue;
            }
            node.shift_with(|value| plan.apply(value));
            changed += 1;
        }
        Ok(changed)
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<bool, Self::Error> {
        self.record_write()?;
        let Some(node) = self.nodes.get_mut(&id) else {
            return Ok(false);
        };
        node.set_parent(parent);
        Ok(true)
    }

    fn delete_nodes(&mut self, query: &NodeQuery) -> Result<u64, Self::Error> {
        self.record_write()?;
        let before = self.nodes.len();
        self.nodes.retain(|_, node| !query.matches(node));
        Ok((before - self.nodes.len()) as u64)
    }
}

impl TreeTx for MemoryTx<'_> {
    fn commit(self) -> Result<(), Self::Error> {
        self.store.nodes = self.nodes;
        self.store.next_id = self.next_id;
        Ok(())
    }
}

fn select(nodes: &BTreeMap<NodeId, Node>, query: &NodeQuery) -> Vec<Node> {
    let mut out: Vec<Node> = nodes
        .values()
        .filter(|node| query.matches(node))
        .cloned()
        .collect();
    match query.order {
        SortOrder::LeftAscending => out.sort_by(|a, b| a.preorder_cmp(b)),
        SortOrder::LeftDescending => out.sort_by(|a, b| b.preorder_cmp(a)),
    }
    if let Some(limit) = query.limit {
        out.truncate(limit);
    }
    out
}

fn count(nodes: &BTreeMap<NodeId, Node>, query: &NodeQuery) -> u64 {
    nodes.values().filter(|node| query.matches(node)).count() as u64
}

fn max_right(nodes: &BTreeMap<NodeId, Node>, scope: Option<&ScopeKey>) -> i64 {
    nodes
        .values()
        .filter(|node| node.scope() == scope)
        .map(Node::right)
        .max()
        .unwrap_or(0)
}
