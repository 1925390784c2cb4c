use super::*;
use crate::ids::ScopeKey;
use crate::interval::{Attributes, NodeRow};

fn node(id: i64, parent: Option<i64>, left: i64, right: i64) -> Node {
    Node::from(NodeRow {
        id: NodeId::new(id),
        scope: None,
        parent: parent.map(NodeId::new),
        bounds: Bounds::try_new(left, right).unwrap(),
        attributes: Attributes::new(),
    })
}

fn applied(plan: &ShiftPlan, node: &Node) -> (i64, i64) {
    (plan.apply(node.left()), plan.apply(node.right()))
}

#[test]
fn insert_appends_after_max_right() {
    assert_eq!(plan_insert(0), Bounds::try_new(1, 2).unwrap());
    assert_eq!(plan_insert(4), Bounds::try_new(5, 6).unwrap());
}

#[test]
fn position_parsing() {
    assert_eq!("left".parse::<MovePosition>().unwrap(), MovePosition::LeftOf);
    assert_eq!("right_of".parse::<MovePosition>().unwrap(), MovePosition::RightOf);
    assert_eq!(" child ".parse::<MovePosition>().unwrap(), MovePosition::ChildOf);
    let err = "root".parse::<MovePosition>().unwrap_err();
    assert_eq!(err.code(), "INVALID_POSITION");
    assert!(matches!(err, TreeError::InvalidPosition(raw) if raw == "root"));
}

#[test]
fn child_of_earlier_root_becomes_first_child() {
    let a = node(1, None, 1, 2);
    let b = node(2, None, 3, 4);

    let plan = plan_move(&b, &a, MovePosition::ChildOf).unwrap();
    assert_eq!(plan.new_bounds, Bounds::try_new(2, 3).unwrap());
    assert_eq!(plan.new_parent, Some(a.id()));
    assert_eq!(plan.shift, -1);
    assert_eq!(plan.updown, 2);
    assert_eq!(applied(&plan.shifts, &a), (1, 4));
    assert_eq!(applied(&plan.shifts, &b), (2, 3));
}

#[test]
fn child_of_later_node_becomes_last_child() {
    // r(1,10): x(2,3) y(4,9): y1(5,6) y2(7,8)
    let r = node(1, None, 1, 10);
    let x = node(2, Some(1), 2, 3);
    let y = node(3, Some(1), 4, 9);
    let y1 = node(4, Some(3), 5, 6);
    let y2 = node(5, Some(3), 7, 8);

    let plan = plan_move(&x, &y, MovePosition::ChildOf).unwrap();
    assert_eq!(plan.new_parent, Some(y.id()));
    assert_eq!(applied(&plan.shifts, &r), (1, 10));
    assert_eq!(applied(&plan.shifts, &y), (2, 9));
    assert_eq!(applied(&plan.shifts, &y1), (3, 4));
    assert_eq!(applied(&plan.shifts, &y2), (5, 6));
    assert_eq!(applied(&plan.shifts, &x), (7, 8));
}

#[test]
fn left_of_first_sibling_reorders_and_keeps_parent_interval() {
    let r = node(1, None, 1, 8);
    let first = node(2, Some(1), 2, 3);
    let second = node(3, Some(1), 4, 5);
    let third = node(4, Some(1), 6, 7);

    let plan = plan_move(&third, &first, MovePosition::LeftOf).unwrap();
    assert_eq!(plan.new_parent, Some(r.id()));
    assert_eq!(plan.region, Span::new(2, 7).unwrap());
    assert_eq!(applied(&plan.shifts, &r), (1, 8));
    assert_eq!(applied(&plan.shifts, &third), (2, 3));
    assert_eq!(applied(&plan.shifts, &first), (4, 5));
    assert_eq!(applied(&plan.shifts, &second), (6, 7));
}

#[test]
fn right_of_later_sibling_moves_forward() {
    let r = node(1, None, 1, 8);
    let first = node(2, Some(1), 2, 3);
    let second = node(3, Some(1), 4, 5);
    let third = node(4, Some(1), 6, 7);

    let plan = plan_move(&first, &third, MovePosition::RightOf).unwrap();
    assert_eq!(plan.updown, -2);
    assert_eq!(applied(&plan.shifts, &r), (1, 8));
    assert_eq!(applied(&plan.shifts, &second), (2, 3));
    assert_eq!(applied(&plan.shifts, &third), (4, 5));
    assert_eq!(applied(&plan.shifts, &first), (6, 7));
}

#[test]
fn right_of_enclosing_ancestor_moves_past_its_right_edge() {
    // a(1,6): b(2,5): c(3,4)
    let a = node(1, None, 1, 6);
    let b = node(2, Some(1), 2, 5);
    let c = node(3, Some(2), 3, 4);

    let plan = plan_move(&c, &a, MovePosition::RightOf).unwrap();
    assert_eq!(plan.new_parent, None);
    assert_eq!(applied(&plan.shifts, &a), (1, 4));
    assert_eq!(applied(&plan.shifts, &b), (2, 3));
    assert_eq!(applied(&plan.shifts, &c), (5, 6));
}

#[test]
fn left_of_enclosing_ancestor_moves_before_its_left_edge() {
    let a = node(1, None, 1, 6);
    let b = node(2, Some(1), 2, 5);
    let c = node(3, Some(2), 3, 4);

    let plan = plan_move(&c, &b, MovePosition::LeftOf).unwrap();
    assert_eq!(plan.new_parent, Some(a.id()));
    assert_eq!(applied(&plan.shifts, &a), (1, 6));
    assert_eq!(applied(&plan.shifts, &c), (2, 3));
    assert_eq!(applied(&plan.shifts, &b), (4, 5));
}

#[test]
fn subtree_moves_as_a_block() {
    // a(1,2) b(3,8): b1(4,5) b2(6,7) c(9,10)
    let a = node(1, None, 1, 2);
    let b = node(2, None, 3, 8);
    let b1 = node(3, Some(2), 4, 5);
    let b2 = node(4, Some(2), 6, 7);
    let c = node(5, None, 9, 10);

    let plan = plan_move(&b, &c, MovePosition::RightOf).unwrap();
    assert_eq!(plan.new_bounds, Bounds::try_new(5, 10).unwrap());
    assert_eq!(applied(&plan.shifts, &a), (1, 2));
    assert_eq!(applied(&plan.shifts, &c), (3, 4));
    assert_eq!(applied(&plan.shifts, &b), (5, 10));
    assert_eq!(applied(&plan.shifts, &b1), (6, 7));
    assert_eq!(applied(&plan.shifts, &b2), (8, 9));
}

#[test]
fn moving_into_own_subtree_is_rejected() {
    let a = node(1, None, 1, 6);
    let b = node(2, Some(1), 2, 5);
    let c = node(3, Some(2), 3, 4);

    for target in [&a, &b, &c] {
        let err = plan_move(&a, target, MovePosition::ChildOf).unwrap_err();
        assert!(matches!(err, TreeError::IllegalMove { .. }));
    }
    assert!(matches!(
        plan_move(&b, &c, MovePosition::LeftOf),
        Err(TreeError::IllegalMove { .. })
    ));
}

#[test]
fn cross_scope_moves_are_rejected() {
    let a = node(1, None, 1, 2);
    let foreign = Node::from(NodeRow {
        id: NodeId::new(2),
        scope: Some(ScopeKey::try_new("other").unwrap()),
        parent: None,
        bounds: Bounds::try_new(1, 2).unwrap(),
        attributes: Attributes::new(),
    });
    assert!(matches!(
        plan_move(&a, &foreign, MovePosition::ChildOf),
        Err(TreeError::ScopeMismatch { .. })
    ));
}

#[test]
fn adjacent_move_is_a_noop_shift() {
    let r = node(1, None, 1, 6);
    let first = node(2, Some(1), 2, 3);
    let second = node(3, Some(1), 4, 5);

    let plan = plan_move(&first, &second, MovePosition::LeftOf).unwrap();
    assert_eq!(plan.shift, 0);
    assert!(plan.shifts.is_noop());
    assert!(!plan.shifts.touches(r.bounds()));
}

#[test]
fn delete_closes_gap_after_subtree() {
    // a(1,6): b(2,3) c(4,5); d(7,10): e(8,9)
    let a = node(1, None, 1, 6);
    let d = node(4, None, 7, 10);
    let e = node(5, Some(4), 8, 9);

    let plan = plan_delete(&a);
    assert_eq!(plan.gap, 6);
    assert_eq!(plan.pruned, a.bounds());
    assert_eq!(applied(&plan.shifts, &d), (1, 4));
    assert_eq!(applied(&plan.shifts, &e), (2, 3));
}

#[test]
fn delete_of_inner_leaf_shrinks_ancestors() {
    let a = node(1, None, 1, 6);
    let b = node(2, Some(1), 2, 3);
    let c = node(3, Some(1), 4, 5);

    let plan = plan_delete(&b);
    assert_eq!(plan.gap, 2);
    assert_eq!(applied(&plan.shifts, &a), (1, 4));
    assert_eq!(applied(&plan.shifts, &c), (2, 3));
}

#[test]
fn span_construction() {
    assert!(Span::new(3, 2).is_none());
    let span = Span::new(2, 2).unwrap();
    assert!(span.contains(2));
    assert!(!span.contains(3));
    assert!(Span::at_least(5).contains(i64::MAX));
}
