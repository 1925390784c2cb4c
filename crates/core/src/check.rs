#![forbid(unsafe_code)]

use crate::ids::NodeId;
use crate::interval::Node;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// `right - left` is not a positive odd number.
    BadWidth { node: NodeId, left: i64, right: i64 },
    DuplicateBoundary { value: i64, first: NodeId, second: NodeId },
    /// Two intervals intersect without one containing the other.
    Overlap { outer: NodeId, inner: NodeId },
    /// The parent column disagrees with the innermost enclosing interval.
    ParentMismatch {
        node: NodeId,
        stored: Option<NodeId>,
        enclosing: Option<NodeId>,
    },
    /// Boundary values are not the contiguous run `1..=2n`.
    Gap { expected: i64, found: i64 },
    MissingFirstRoot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ForestReport {
    pub ok: bool,
    pub nodes: usize,
    pub violations: Vec<Violation>,
}

/// Checks one forest (all nodes sharing a scope) against the nested-set rules.
pub fn check_forest(nodes: &[Node]) -> ForestReport {
    let mut ordered: Vec<&Node> = nodes.iter().collect();
    ordered.sort_by(|a, b| a.preorder_cmp(b));

    let mut violations = Vec::new();

    let mut owners: BTreeMap<i64, NodeId> = BTreeMap::new();
    for node in &ordered {
        let width = node.right() - node.left();
        if width < 1 || width % 2 == 0 {
            violations.push(Violation::BadWidth {
                node: node.id(),
                left: node.left(),
                right: node.right(),
            });
        }
        for value in [node.left(), node.right()] {
            if let Some(first) = owners.insert(value, node.id()) {
                violations.push(Violation::DuplicateBoundary {
                    value,
                    first,
                    second: node.id(),
                });
            }
        }
    }

    for (expected, found) in (1i64..).zip(owners.keys().copied()) {
        if expected != found {
            violations.push(Violation::Gap { expected, found });
            break;
        }
    }

    let mut open: Vec<&Node> = Vec::new();
    for node in &ordered {
        while open.last().is_some_and(|top| top.right() < node.left()) {
            open.pop();
        }
        if let Some(top) = open.last()
            && node.right() > top.right()
        {
            violations.push(Violation::Overlap {
                outer: top.id(),
                inner: node.id(),
            });
        }
        let enclosing = open.last().map(|top| top.id());
        if node.parent() != enclosing {
            violations.push(Violation::ParentMismatch {
                node: node.id(),
                stored: node.parent(),
                enclosing,
            });
        }
        open.push(node);
    }

    if !ordered.is_empty()
        && !ordered
            .iter()
            .any(|node| node.left() == 1 && node.parent().is_none())
    {
        violations.push(Violation::MissingFirstRoot);
    }

    ForestReport {
        ok: violations.is_empty(),
        nodes: ordered.len(),
        violations,
    }
}
