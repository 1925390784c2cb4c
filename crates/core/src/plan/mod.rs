#![forbid(unsafe_code)]

//! Boundary arithmetic for the three structural mutations.
//!
//! Planning is pure: it reads node snapshots and produces a [`ShiftPlan`]
//! (ordered span → delta arms) that a store applies in one statement.

use crate::error::TreeError;
use crate::ids::NodeId;
use crate::interval::{Bounds, Node};
use std::str::FromStr;

/// Inclusive range of boundary values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    lo: i64,
    hi: i64,
}

impl Span {
    /// `None` when the range is empty.
    pub fn new(lo: i64, hi: i64) -> Option<Self> {
        (lo <= hi).then_some(Self { lo, hi })
    }

    pub fn at_least(lo: i64) -> Self {
        Self { lo, hi: i64::MAX }
    }

    pub fn of(bounds: Bounds) -> Self {
        Self {
            lo: bounds.left(),
            hi: bounds.right(),
        }
    }

    pub fn lo(self) -> i64 {
        self.lo
    }

    pub fn hi(self) -> i64 {
        self.hi
    }

    pub fn contains(self, value: i64) -> bool {
        self.lo <= value && value <= self.hi
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShiftArm {
    pub span: Span,
    pub delta: i64,
}

/// First matching arm wins; values matched by no arm stay put. The same arms
/// apply to the left and the right column independently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShiftPlan {
    arms: Vec<ShiftArm>,
}

impl ShiftPlan {
    pub fn arms(&self) -> &[ShiftArm] {
        &self.arms
    }

    pub fn is_noop(&self) -> bool {
        self.arms.iter().all(|arm| arm.delta == 0)
    }

    pub fn apply(&self, value: i64) -> i64 {
        self.arms
            .iter()
            .find(|arm| arm.span.contains(value))
            .map_or(value, |arm| value + arm.delta)
    }

    /// Whether a node with these bounds has any boundary the plan rewrites.
    pub fn touches(&self, bounds: Bounds) -> bool {
        self.apply(bounds.left()) != bounds.left() || self.apply(bounds.right()) != bounds.right()
    }

    fn push(&mut self, span: Option<Span>, delta: i64) {
        if let Some(span) = span
            && delta != 0
        {
            self.arms.push(ShiftArm { span, delta });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovePosition {
    LeftOf,
    RightOf,
    ChildOf,
}

impl MovePosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftOf => "left",
            Self::RightOf => "right",
            Self::ChildOf => "child",
        }
    }
}

impl FromStr for MovePosition {
    type Err = TreeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "left" | "left_of" | "left-of" => Ok(Self::LeftOf),
            "right" | "right_of" | "right-of" => Ok(Self::RightOf),
            "child" | "child_of" | "child-of" => Ok(Self::ChildOf),
            other => Err(TreeError::InvalidPosition(other.to_string())),
        }
    }
}

impl std::fmt::Display for MovePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub node: NodeId,
    pub position: MovePosition,
    pub new_bounds: Bounds,
    pub new_parent: Option<NodeId>,
    /// Delta applied to the moved subtree.
    pub shift: i64,
    /// Delta applied to everything else between the old and new slot.
    pub updown: i64,
    pub region: Span,
    pub shifts: ShiftPlan,
}

/// Plans relocating `node`'s subtree next to or into `target`.
///
/// Both snapshots must be fresh: the plan is only correct against the
/// boundaries it was computed from.
pub fn plan_move(node: &Node, target: &Node, position: MovePosition) -> Result<MovePlan, TreeError> {
    if !node.same_scope(target) {
        return Err(TreeError::ScopeMismatch {
            node: node.id(),
            target: target.id(),
        });
    }

    let own = node.bounds();
    if own.contains_value(target.left()) || own.contains_value(target.right()) {
        return Err(TreeError::IllegalMove {
            node: node.id(),
            target: target.id(),
        });
    }

    let (left, right) = (own.left(), own.right());
    let extent = own.extent();
    let (t_left, t_right) = (target.left(), target.right());

    let (new_left, new_right) = match position {
        MovePosition::LeftOf if t_left < left => (t_left, t_left + extent - 1),
        MovePosition::LeftOf => (t_left - extent, t_left - 1),
        MovePosition::RightOf if t_right < right => (t_right + 1, t_right + extent),
        MovePosition::RightOf => (t_right - extent + 1, t_right),
        // Entering from the front makes it the first child, from behind the last.
        MovePosition::ChildOf if t_left < left => (t_left + 1, t_left + extent),
        MovePosition::ChildOf => (t_right - extent, t_right - 1),
    };

    let new_parent = match position {
        MovePosition::ChildOf => Some(target.id()),
        MovePosition::LeftOf | MovePosition::RightOf => target.parent(),
    };

    let shift = new_left - left;
    let updown = if shift > 0 { -extent } else { extent };
    let region = Span {
        lo: left.min(new_left),
        hi: right.max(new_right),
    };

    let mut shifts = ShiftPlan::default();
    if shift != 0 {
        shifts.push(Some(Span::of(own)), shift);
        shifts.push(Some(region), updown);
    }

    let new_bounds = Bounds::try_new(new_left, new_right).map_err(TreeError::store)?;

    Ok(MovePlan {
        node: node.id(),
        position,
        new_bounds,
        new_parent,
        shift,
        updown,
        region,
        shifts,
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletePlan {
    pub node: NodeId,
    /// The removed subtree; rows strictly inside it are the descendants.
    pub pruned: Bounds,
    /// Width of the closed gap.
    pub gap: i64,
    pub shifts: ShiftPlan,
}

/// Plans removing `node`'s subtree and closing the gap it leaves behind.
pub fn plan_delete(node: &Node) -> DeletePlan {
    let pruned = node.bounds();
    let gap = pruned.extent();
    let mut shifts = ShiftPlan::default();
    shifts.push(Some(Span::at_least(pruned.right())), -gap);
    DeletePlan {
        node: node.id(),
        pruned,
        gap,
        shifts,
    }
}

/// Bounds for a node created in a forest whose largest right boundary is
/// `max_right` (0 for an empty forest).
pub fn plan_insert(max_right: i64) -> Bounds {
    Bounds::appended_after(max_right)
}

#[cfg(test)]
mod tests;
