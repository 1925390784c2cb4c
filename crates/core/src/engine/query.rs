#![forbid(unsafe_code)]

use super::NestedSet;
use crate::check::{ForestReport, check_forest};
use crate::error::TreeError;
use crate::ids::{NodeId, ScopeKey};
use crate::interval::Node;
use crate::query::{Containment, NodeFilter, NodeQuery, SortOrder};
use crate::store::TreeRead;

impl<S: TreeRead> NestedSet<S> {
    fn find(&self, query: NodeQuery) -> Result<Vec<Node>, TreeError> {
        self.store.find_nodes(&query).map_err(TreeError::store)
    }

    fn first(&self, query: NodeQuery) -> Result<Option<Node>, TreeError> {
        Ok(self.find(query.limit(1))?.into_iter().next())
    }

    fn count(&self, query: NodeQuery) -> Result<u64, TreeError> {
        self.store.count_nodes(&query).map_err(TreeError::store)
    }

    pub fn node(&self, id: NodeId) -> Result<Option<Node>, TreeError> {
        self.store.load_node(id).map_err(TreeError::store)
    }

    /// Fresh copy of `node`; fails if it has been removed meanwhile.
    pub fn reload(&self, node: &Node) -> Result<Node, TreeError> {
        self.node(node.id())?
            .ok_or(TreeError::UnpersistedNode(node.id()))
    }

    /// Every node of the forest, in pre-order.
    pub fn full_forest(&self, scope: Option<&ScopeKey>) -> Result<Vec<Node>, TreeError> {
        self.find(NodeQuery::in_scope(scope))
    }

    pub fn roots(&self, scope: Option<&ScopeKey>) -> Result<Vec<Node>, TreeError> {
        self.find(NodeQuery::in_scope(scope).filter(NodeFilter::Parent(None)))
    }

    pub fn root(&self, scope: Option<&ScopeKey>) -> Result<Option<Node>, TreeError> {
        self.first(NodeQuery::in_scope(scope).filter(NodeFilter::Parent(None)))
    }

    pub fn parent_of(&self, node: &Node) -> Result<Option<Node>, TreeError> {
        match node.parent() {
            Some(parent) => self.node(parent),
            None => Ok(None),
        }
    }

    /// Root first, `node` last.
    pub fn self_and_ancestors(&self, node: &Node) -> Result<Vec<Node>, TreeError> {
        self.find(
            NodeQuery::in_scope(node.scope())
                .filter(NodeFilter::Encloses(node.bounds(), Containment::Inclusive)),
        )
    }

    pub fn ancestors(&self, node: &Node) -> Result<Vec<Node>, TreeError> {
        self.find(
            NodeQuery::in_scope(node.scope())
                .filter(NodeFilter::Encloses(node.bounds(), Containment::Inclusive))
                .filter(NodeFilter::NotId(node.id())),
        )
    }

    /// All roots when `node` is a root, otherwise every child of its parent.
    pub fn self_and_siblings(&self, node: &Node) -> Result<Vec<Node>, TreeError> {
        self.find(NodeQuery::in_scope(node.scope()).filter(NodeFilter::Parent(node.parent())))
    }

    pub fn siblings(&self, node: &Node) -> Result<Vec<Node>, TreeError> {
        self.find(
            NodeQuery::in_scope(node.scope())
                .filter(NodeFilter::Parent(node.parent()))
                .filter(NodeFilter::NotId(node.id())),
        )
    }

    /// Depth below the forest's top level; roots are at level 0.
    pub fn level(&self, node: &Node) -> Result<u64, TreeError> {
        if node.parent().is_none() {
            return Ok(0);
        }
        self.count(
            NodeQuery::in_scope(node.scope())
                .filter(NodeFilter::Encloses(node.bounds(), Containment::Strict)),
        )
    }

    pub fn self_and_descendants(&self, node: &Node) -> Result<Vec<Node>, TreeError> {
        self.find(
            NodeQuery::in_scope(node.scope())
                .filter(NodeFilter::Within(node.bounds(), Containment::Inclusive)),
        )
    }

    pub fn descendants(&self, node: &Node) -> Result<Vec<Node>, TreeError> {
        self.find(
            NodeQuery::in_scope(node.scope())
                .filter(NodeFilter::Within(node.bounds(), Containment::Inclusive))
                .filter(NodeFilter::NotId(node.id())),
        )
    }

    pub fn children(&self, node: &Node) -> Result<Vec<Node>, TreeError> {
        self.find(NodeQuery::in_scope(node.scope()).filter(NodeFilter::Parent(Some(node.id()))))
    }

    pub fn children_count(&self, node: &Node) -> Result<u64, TreeError> {
        self.count(NodeQuery::in_scope(node.scope()).filter(NodeFilter::Parent(Some(node.id()))))
    }

    /// Descendants without children of their own.
    pub fn leaves(&self, node: &Node) -> Result<Vec<Node>, TreeError> {
        self.find(
            NodeQuery::in_scope(node.scope())
                .filter(NodeFilter::Within(node.bounds(), Containment::Strict))
                .filter(NodeFilter::Leaf),
        )
    }

    /// Nearest earlier sibling. Roots have none.
    pub fn left_sibling(&self, node: &Node) -> Result<Option<Node>, TreeError> {
        let Some(parent) = node.parent() else {
            return Ok(None);
        };
        self.first(
            NodeQuery::in_scope(node.scope())
                .filter(NodeFilter::Parent(Some(parent)))
                .filter(NodeFilter::LeftBelow(node.left()))
                .order(SortOrder::LeftDescending),
        )
    }

    /// Nearest later sibling. Roots have none.
    pub fn right_sibling(&self, node: &Node) -> Result<Option<Node>, TreeError> {
        let Some(parent) = node.parent() else {
            return Ok(None);
        };
        self.first(
            NodeQuery::in_scope(node.scope())
                .filter(NodeFilter::Parent(Some(parent)))
                .filter(NodeFilter::LeftAbove(node.left())),
        )
    }

    pub fn validate(&self, scope: Option<&ScopeKey>) -> Result<ForestReport, TreeError> {
        let nodes = self.full_forest(scope)?;
        Ok(check_forest(&nodes))
    }
}
