use super::*;
use crate::interval::{Attributes, Node};
use crate::memory::MemoryStore;
use crate::plan::MovePosition;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Create { scope: u8 },
    Move { node: usize, target: usize, position: MovePosition },
    Delete { node: usize },
}

fn arb_position() -> impl Strategy<Value = MovePosition> {
    prop_oneof![
        Just(MovePosition::LeftOf),
        Just(MovePosition::RightOf),
        Just(MovePosition::ChildOf),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..2).prop_map(|scope| Op::Create { scope }),
        5 => (any::<usize>(), any::<usize>(), arb_position())
            .prop_map(|(node, target, position)| Op::Move { node, target, position }),
        1 => any::<usize>().prop_map(|node| Op::Delete { node }),
    ]
}

fn scope_key(scope: u8) -> Option<ScopeKey> {
    match scope {
        0 => None,
        _ => ScopeKey::try_new(format!("scope-{scope}")).ok(),
    }
}

fn pick(nodes: &[Node], index: usize) -> Option<&Node> {
    if nodes.is_empty() {
        None
    } else {
        nodes.get(index % nodes.len())
    }
}

fn all_nodes(tree: &NestedSet<MemoryStore>) -> Vec<Node> {
    let mut nodes: Vec<Node> = tree.store().nodes().cloned().collect();
    nodes.sort_by_key(|n| n.id());
    nodes
}

fn check_properties(tree: &NestedSet<MemoryStore>) -> Result<(), TestCaseError> {
    for scope in [scope_key(0), scope_key(1)] {
        let report = tree.validate(scope.as_ref()).unwrap();
        prop_assert!(report.ok, "violations: {:?}", report.violations);

        let forest = tree.full_forest(scope.as_ref()).unwrap();
        for node in &forest {
            let descendants = tree.descendants(node).unwrap();
            prop_assert_eq!(node.descendant_count(), descendants.len() as i64);

            let ancestors = tree.ancestors(node).unwrap();
            prop_assert_eq!(tree.level(node).unwrap(), ancestors.len() as u64);

            let chain = tree.self_and_ancestors(node).unwrap();
            for other in &forest {
                let listed = chain.iter().any(|n| n.id() == other.id());
                prop_assert_eq!(node.is_or_descends_from(other), listed);
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_mutations_preserve_the_nested_set(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut tree = NestedSet::new(MemoryStore::new(), TreeConfig::default()).unwrap();

        for op in ops {
            match op {
                Op::Create { scope } => {
                    tree.create(scope_key(scope), Attributes::new()).unwrap();
                }
                Op::Move { node, target, position } => {
                    let nodes = all_nodes(&tree);
                    let (Some(node), Some(target)) = (pick(&nodes, node), pick(&nodes, target)) else {
                        continue;
                    };
                    let before = all_nodes(&tree);
                    let illegal = node.same_scope(target) && target.is_or_descends_from(node);
                    match tree.move_to(node, target, position) {
                        Ok(moved) => {
                            prop_assert!(!illegal);
                            prop_assert_eq!(moved.extent(), node.extent());
                            let expected_parent = match position {
                                MovePosition::ChildOf => Some(target.id()),
                                _ => target.parent(),
                            };
                            prop_assert_eq!(moved.parent(), expected_parent);
                        }
                        Err(TreeError::IllegalMove { .. }) => {
                            prop_assert!(illegal);
                            prop_assert_eq!(all_nodes(&tree), before);
                        }
                        Err(TreeError::ScopeMismatch { .. }) => {
                            prop_assert!(!node.same_scope(target));
                            prop_assert_eq!(all_nodes(&tree), before);
                        }
                        Err(other) => prop_assert!(false, "unexpected error: {other}"),
                    }
                }
                Op::Delete { node } => {
                    let nodes = all_nodes(&tree);
                    let Some(node) = pick(&nodes, node) else {
                        continue;
                    };
                    let scope = node.scope().cloned();
                    let forest_before = tree.full_forest(scope.as_ref()).unwrap();
                    let max_before = forest_before.iter().map(Node::right).max().unwrap_or(0);
                    let subtree = node.descendant_count() as usize + 1;

                    let report = tree.delete(node).unwrap();
                    prop_assert_eq!(report.removed as usize, subtree);
                    prop_assert_eq!(report.gap, node.extent());

                    let forest_after = tree.full_forest(scope.as_ref()).unwrap();
                    prop_assert_eq!(forest_after.len(), forest_before.len() - subtree);
                    let max_after = forest_after.iter().map(Node::right).max().unwrap_or(0);
                    prop_assert_eq!(max_after, max_before - report.gap);

                    for after in &forest_after {
                        let Some(prior) = forest_before.iter().find(|n| n.id() == after.id()) else {
                            prop_assert!(false, "node {} appeared from nowhere", after.id());
                            continue;
                        };
                        let shift = |value: i64| if value >= node.right() { value - report.gap } else { value };
                        prop_assert_eq!(after.left(), shift(prior.left()));
                        prop_assert_eq!(after.right(), shift(prior.right()));
                    }
                }
            }
            check_properties(&tree)?;
        }
    }
}
