use super::*;

fn node(id: i64, parent: Option<i64>, left: i64, right: i64) -> Node {
    Node::from(NodeRow {
        id: NodeId::new(id),
        scope: None,
        parent: parent.map(NodeId::new),
        bounds: Bounds::try_new(left, right).unwrap(),
        attributes: Attributes::new(),
    })
}

#[test]
fn bounds_validation() {
    assert_eq!(
        Bounds::try_new(0, 1).unwrap_err(),
        BoundsError::NotPositive { left: 0 }
    );
    assert_eq!(
        Bounds::try_new(3, 3).unwrap_err(),
        BoundsError::Inverted { left: 3, right: 3 }
    );
    assert!(Bounds::try_new(1, 2).is_ok());
}

#[test]
fn appended_bounds_follow_max_right() {
    assert_eq!(Bounds::appended_after(0), Bounds::try_new(1, 2).unwrap());
    assert_eq!(Bounds::appended_after(8), Bounds::try_new(9, 10).unwrap());
    assert_eq!(Bounds::appended_after(-4), Bounds::try_new(1, 2).unwrap());
}

#[test]
fn width_derived_counts() {
    let leaf = Bounds::try_new(4, 5).unwrap();
    assert!(leaf.is_leaf());
    assert_eq!(leaf.descendant_count(), 0);
    assert_eq!(leaf.extent(), 2);

    let root = Bounds::try_new(1, 10).unwrap();
    assert!(!root.is_leaf());
    assert_eq!(root.descendant_count(), 4);
    assert_eq!(root.extent(), 10);
}

#[test]
fn root_and_child_predicates() {
    let first_root = node(1, None, 1, 6);
    let second_root = node(2, None, 7, 8);
    let child = node(3, Some(1), 2, 3);

    assert!(first_root.is_root());
    assert!(!first_root.is_child());
    assert!(!second_root.is_root());
    assert!(!second_root.is_child());
    assert!(child.is_child());
    assert!(!child.is_root());
}

#[test]
fn containment_tests_are_reflexive_and_scoped() {
    let root = node(1, None, 1, 6);
    let mid = node(2, Some(1), 2, 5);
    let leaf = node(3, Some(2), 3, 4);

    assert!(leaf.is_or_descends_from(&leaf));
    assert!(leaf.is_or_descends_from(&mid));
    assert!(leaf.is_or_descends_from(&root));
    assert!(!root.is_or_descends_from(&leaf));

    assert!(root.is_or_is_ancestor_of(&leaf));
    assert!(root.is_ancestor_of(&mid));
    assert!(!root.is_ancestor_of(&root));
    assert!(mid.is_descendant_of(&root));

    let foreign = Node::from(NodeRow {
        id: NodeId::new(9),
        scope: Some(ScopeKey::try_new("other").unwrap()),
        parent: None,
        bounds: Bounds::try_new(1, 6).unwrap(),
        attributes: Attributes::new(),
    });
    assert!(!leaf.is_or_descends_from(&foreign));
}

#[test]
fn preorder_cmp_sorts_by_left() {
    let mut nodes = vec![node(3, Some(1), 4, 5), node(1, None, 1, 6), node(2, Some(1), 2, 3)];
    nodes.sort_by(|a, b| a.preorder_cmp(b));
    let ids: Vec<i64> = nodes.iter().map(|n| n.id().get()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}
