#![forbid(unsafe_code)]

//! The interval model: boundary pairs and the node record that carries them.
//!
//! A node's `left`/`right` pair encloses the pairs of all of its descendants.
//! Ordering nodes by `left` yields a depth-first pre-order of the forest.

use crate::ids::{NodeId, ScopeKey};
use serde::Serialize;
use std::cmp::Ordering;

/// Ordinary (non-structural) record fields.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Bounds {
    left: i64,
    right: i64,
}

impl Bounds {
    pub fn try_new(left: i64, right: i64) -> Result<Self, BoundsError> {
        if left < 1 {
            return Err(BoundsError::NotPositive { left });
        }
        if right <= left {
            return Err(BoundsError::Inverted { left, right });
        }
        Ok(Self { left, right })
    }

    /// The slot a freshly created node takes: a rightmost root-level leaf.
    pub fn appended_after(max_right: i64) -> Self {
        let max_right = max_right.max(0);
        Self {
            left: max_right + 1,
            right: max_right + 2,
        }
    }

    pub fn left(self) -> i64 {
        self.left
    }

    pub fn right(self) -> i64 {
        self.right
    }

    /// Width of the subtree footprint, `right - left + 1`.
    pub fn extent(self) -> i64 {
        self.right - self.left + 1
    }

    pub fn descendant_count(self) -> i64 {
        (self.right - self.left - 1) / 2
    }

    pub fn is_leaf(self) -> bool {
        self.right - self.left == 1
    }

    pub fn contains_value(self, value: i64) -> bool {
        self.left <= value && value <= self.right
    }

    /// `self` is `other` or one of its ancestors.
    pub fn encloses(self, other: Bounds) -> bool {
        self.left <= other.left && other.right <= self.right
    }

    pub fn strictly_encloses(self, other: Bounds) -> bool {
        self.left < other.left && other.right < self.right
    }

    pub fn is_disjoint(self, other: Bounds) -> bool {
        self.right < other.left || other.right < self.left
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.left, self.right)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundsError {
    NotPositive { left: i64 },
    Inverted { left: i64, right: i64 },
}

impl std::fmt::Display for BoundsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive { left } => write!(f, "left boundary must be positive (left={left})"),
            Self::Inverted { left, right } => {
                write!(f, "left must be below right (left={left}, right={right})")
            }
        }
    }
}

impl std::error::Error for BoundsError {}

/// Raw column values as a store hands them back. Converting into a [`Node`]
/// is the only way to obtain one outside this crate, and a `Node` exposes its
/// structural fields read-only.
#[derive(Clone, Debug)]
pub struct NodeRow {
    pub id: NodeId,
    pub scope: Option<ScopeKey>,
    pub parent: Option<NodeId>,
    pub bounds: Bounds,
    pub attributes: Attributes,
}

/// A persisted record participating in a forest.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    id: NodeId,
    scope: Option<ScopeKey>,
    parent: Option<NodeId>,
    bounds: Bounds,
    attributes: Attributes,
}

impl From<NodeRow> for Node {
    fn from(row: NodeRow) -> Self {
        Self {
            id: row.id,
            scope: row.scope,
            parent: row.parent,
            bounds: row.bounds,
            attributes: row.attributes,
        }
    }
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn scope(&self) -> Option<&ScopeKey> {
        self.scope.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn left(&self) -> i64 {
        self.bounds.left
    }

    pub fn right(&self) -> i64 {
        self.bounds.right
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// The first root of a forest: no parent and `left == 1`.
    ///
    /// Later roots of a multi-root forest answer `false` here and `false` to
    /// [`Node::is_child`]; use `parent().is_none()` to test for any root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none() && self.bounds.left == 1
    }

    pub fn is_child(&self) -> bool {
        self.parent.is_some() && self.bounds.left > 1
    }

    pub fn is_leaf(&self) -> bool {
        self.bounds.is_leaf()
    }

    pub fn extent(&self) -> i64 {
        self.bounds.extent()
    }

    pub fn descendant_count(&self) -> i64 {
        self.bounds.descendant_count()
    }

    pub fn same_scope(&self, other: &Node) -> bool {
        self.scope == other.scope
    }

    /// `self` is `other` or lies inside `other`'s subtree.
    pub fn is_or_descends_from(&self, other: &Node) -> bool {
        self.same_scope(other)
            && other.bounds.left <= self.bounds.left
            && self.bounds.left < other.bounds.right
    }

    /// `other` is `self` or lies inside `self`'s subtree.
    pub fn is_or_is_ancestor_of(&self, other: &Node) -> bool {
        other.is_or_descends_from(self)
    }

    pub fn is_descendant_of(&self, other: &Node) -> bool {
        self.same_scope(other) && other.bounds.strictly_encloses(self.bounds)
    }

    pub fn is_ancestor_of(&self, other: &Node) -> bool {
        other.is_descendant_of(self)
    }

    /// Pre-order comparison (by `left`).
    pub fn preorder_cmp(&self, other: &Node) -> Ordering {
        self.bounds.left.cmp(&other.bounds.left)
    }

    pub(crate) fn shift_with(&mut self, shift: impl Fn(i64) -> i64) {
        self.bounds = Bounds {
            left: shift(self.bounds.left),
            right: shift(self.bounds.right),
        };
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}

#[cfg(test)]
mod tests;
