#![forbid(unsafe_code)]

use super::NestedSet;
use crate::error::TreeError;
use crate::ids::ScopeKey;
use crate::interval::{Attributes, Node};
use crate::plan::{MovePosition, plan_delete, plan_insert, plan_move};
use crate::query::{Containment, NodeFilter, NodeQuery};
use crate::store::{NewNode, TreeRead, TreeStore, TreeTx, TreeWrite};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    /// Rows removed, the node itself included.
    pub removed: u64,
    /// How far every later boundary moved down.
    pub gap: i64,
}

impl<S: TreeStore> NestedSet<S> {
    /// Creates a rightmost root-level leaf in `scope`.
    pub fn create(&mut self, scope: Option<ScopeKey>, attributes: Attributes) -> Result<Node, TreeError> {
        self.check_scope(scope.as_ref())?;

        let mut tx = self.store.begin().map_err(TreeError::store)?;
        let max_right = tx.max_right(scope.as_ref()).map_err(TreeError::store)?;
        let node = tx
            .insert_node(NewNode {
                scope,
                parent: None,
                bounds: plan_insert(max_right),
                attributes,
            })
            .map_err(TreeError::store)?;
        tx.commit().map_err(TreeError::store)?;

        debug!(node = %node.id(), scope = ?node.scope(), bounds = %node.bounds(), "node created");
        Ok(node)
    }

    /// Creates a node and moves it under `parent`.
    pub fn create_child_of(&mut self, parent: &Node, attributes: Attributes) -> Result<Node, TreeError> {
        let node = self.create(parent.scope().cloned(), attributes)?;
        self.move_to(&node, parent, MovePosition::ChildOf)
    }

    /// Removes `node` with its whole subtree and closes the gap behind it.
    ///
    /// A node that is already gone is a no-op.
    pub fn delete(&mut self, node: &Node) -> Result<DeleteReport, TreeError> {
        let mut tx = self.store.begin().map_err(TreeError::store)?;
        let Some(fresh) = tx.load_node(node.id()).map_err(TreeError::store)? else {
            return Ok(DeleteReport::default());
        };

        let plan = plan_delete(&fresh);
        let scope = fresh.scope();
        let descendants = tx
            .delete_nodes(
                &NodeQuery::in_scope(scope)
                    .filter(NodeFilter::Within(plan.pruned, Containment::Strict)),
            )
            .map_err(TreeError::store)?;
        let own = tx
            .delete_nodes(&NodeQuery::in_scope(scope).filter(NodeFilter::Id(fresh.id())))
            .map_err(TreeError::store)?;
        let shifted = tx.apply_shift(scope, &plan.shifts).map_err(TreeError::store)?;
        tx.commit().map_err(TreeError::store)?;

        let report = DeleteReport {
            removed: descendants + own,
            gap: plan.gap,
        };
        debug!(
            node = %fresh.id(),
            scope = ?fresh.scope(),
            removed = report.removed,
            gap = report.gap,
            shifted,
            "subtree deleted"
        );
        Ok(report)
    }

    /// Relocates `node`'s subtree relative to `target` and returns the
    /// committed state of `node`.
    pub fn move_to(&mut self, node: &Node, target: &Node, position: MovePosition) -> Result<Node, TreeError> {
        let mut tx = self.store.begin().map_err(TreeError::store)?;
        let fresh = tx
            .load_node(node.id())
            .map_err(TreeError::store)?
            .ok_or(TreeError::UnpersistedNode(node.id()))?;
        let target = tx
            .load_node(target.id())
            .map_err(TreeError::store)?
            .ok_or(TreeError::UnpersistedNode(target.id()))?;

        let plan = match plan_move(&fresh, &target, position) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(node = %fresh.id(), target = %target.id(), %position, error = %err, "move rejected");
                return Err(err);
            }
        };

        let mut shifted = 0;
        if !plan.shifts.is_noop() {
            shifted = tx
                .apply_shift(fresh.scope(), &plan.shifts)
                .map_err(TreeError::store)?;
        }
        tx.set_parent(fresh.id(), plan.new_parent)
            .map_err(TreeError::store)?;
        tx.commit().map_err(TreeError::store)?;

        debug!(
            node = %fresh.id(),
            target = %target.id(),
            %position,
            from = %fresh.bounds(),
            to = %plan.new_bounds,
            shift = plan.shift,
            updown = plan.updown,
            shifted,
            "subtree moved"
        );
        self.reload(&fresh)
    }

    pub fn move_to_left_of(&mut self, node: &Node, target: &Node) -> Result<Node, TreeError> {
        self.move_to(node, target, MovePosition::LeftOf)
    }

    pub fn move_to_right_of(&mut self, node: &Node, target: &Node) -> Result<Node, TreeError> {
        self.move_to(node, target, MovePosition::RightOf)
    }

    pub fn move_to_child_of(&mut self, node: &Node, target: &Node) -> Result<Node, TreeError> {
        self.move_to(node, target, MovePosition::ChildOf)
    }

    /// Merges `patch` into the node's attributes; `null` values remove keys.
    ///
    /// Structural fields can only change through create/delete/move, so a
    /// patch naming one of them is rejected before anything is written.
    pub fn update_attributes(&mut self, node: &Node, patch: Attributes) -> Result<Node, TreeError> {
        let protected = self.config.protected_fields();
        if let Some(field) = patch
            .keys()
            .find(|key| protected.iter().any(|p| p.eq_ignore_ascii_case(key)))
        {
            warn!(node = %node.id(), field = %field, "structural field write rejected");
            return Err(TreeError::StructuralViolation {
                field: field.clone(),
            });
        }

        let mut tx = self.store.begin().map_err(TreeError::store)?;
        let fresh = tx
            .load_node(node.id())
            .map_err(TreeError::store)?
            .ok_or(TreeError::UnpersistedNode(node.id()))?;

        let mut attributes = fresh.attributes().clone();
        for (key, value) in patch {
            if value.is_null() {
                attributes.remove(&key);
            } else {
                attributes.insert(key, value);
            }
        }
        tx.write_attributes(fresh.id(), &attributes)
            .map_err(TreeError::store)?;
        tx.commit().map_err(TreeError::store)?;

        self.reload(&fresh)
    }
}
