#![forbid(unsafe_code)]

//! Typed predicates for the store's scoped sequence query.
//!
//! Stores translate these into their own query language; [`NodeFilter::matches`]
//! is the reference semantics.

use crate::ids::{NodeId, ScopeKey};
use crate::interval::{Bounds, Node};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
    Inclusive,
    Strict,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeFilter {
    Id(NodeId),
    NotId(NodeId),
    Parent(Option<NodeId>),
    /// Rows whose interval encloses `bounds` (ancestors).
    Encloses(Bounds, Containment),
    /// Rows whose interval lies within `bounds` (descendants).
    Within(Bounds, Containment),
    LeftBelow(i64),
    LeftAbove(i64),
    Leaf,
}

impl NodeFilter {
    pub fn matches(&self, node: &Node) -> bool {
        let bounds = node.bounds();
        match self {
            Self::Id(id) => node.id() == *id,
            Self::NotId(id) => node.id() != *id,
            Self::Parent(parent) => node.parent() == *parent,
            Self::Encloses(inner, Containment::Inclusive) => bounds.encloses(*inner),
            Self::Encloses(inner, Containment::Strict) => bounds.strictly_encloses(*inner),
            Self::Within(outer, Containment::Inclusive) => outer.encloses(bounds),
            Self::Within(outer, Containment::Strict) => outer.strictly_encloses(bounds),
            Self::LeftBelow(value) => bounds.left() < *value,
            Self::LeftAbove(value) => bounds.left() > *value,
            Self::Leaf => bounds.is_leaf(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    LeftAscending,
    LeftDescending,
}

/// One forest, a conjunction of filters, an order and an optional limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeQuery {
    pub scope: Option<ScopeKey>,
    pub filters: Vec<NodeFilter>,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl NodeQuery {
    pub fn in_scope(scope: Option<&ScopeKey>) -> Self {
        Self {
            scope: scope.cloned(),
            filters: Vec::new(),
            order: SortOrder::LeftAscending,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: NodeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, node: &Node) -> bool {
        node.scope() == self.scope.as_ref() && self.filters.iter().all(|f| f.matches(node))
    }
}
