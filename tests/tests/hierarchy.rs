//! Hierarchical entity scenarios.

use scenekit_tests::{init_tracing, session};
use std::sync::Arc;

// ========== TEST: group_parenting_scenario ==========
#[test]
fn test_group_parenting_scenario() {
    init_tracing();
    let s = session();
    let a = s.create("group", Some("a")).unwrap();
    let b = s.create("group", Some("b")).unwrap();
    b.set_parent(Some(a.as_ref()));

    // A.children() contains B.
    let children = a.children();
    assert_eq!(children.len(), 1);
    assert!(Arc::ptr_eq(&children[0], &b));

    // deleteEntity(A) succeeds and B no longer resolves.
    a.delete();
    assert!(!a.exists());
    assert!(!b.exists());
}

// ========== TEST: descendants_depth_first ==========
#[test]
fn test_descendants_depth_first() {
    init_tracing();
    let s = session();
    let root = s.create("group", Some("root")).unwrap();
    let arm = s.create("group", Some("arm")).unwrap();
    let hand = s.create("group", Some("hand")).unwrap();
    arm.set_parent(Some(root.as_ref()));
    hand.set_parent(Some(arm.as_ref()));

    let names: Vec<_> = root
        .descendants()
        .into_iter()
        .filter_map(|n| n.name())
        .collect();
    assert_eq!(names, ["arm", "hand"]);
}

// ========== TEST: ungroup_moves_children_up ==========
#[test]
fn test_ungroup_moves_children_up() {
    init_tracing();
    let s = session();
    let root = s.create("group", Some("root")).unwrap();
    let shell = s.create("group", Some("shell")).unwrap();
    let inner = s.create("group", Some("inner")).unwrap();
    shell.set_parent(Some(root.as_ref()));
    inner.set_parent(Some(shell.as_ref()));

    shell.ungroup();
    assert_eq!(inner.current_path().as_deref(), Some("|root|inner"));
    assert!(shell.children().is_empty());
}

// ========== TEST: flat_nodes_have_no_hierarchy ==========
#[test]
fn test_flat_nodes_have_no_hierarchy() {
    init_tracing();
    let s = session();
    let net = s.create("network", Some("net")).unwrap();
    let group = s.create("group", Some("g")).unwrap();

    assert!(!net.is_hierarchical());
    assert!(group.is_hierarchical());
    assert!(net.parent().is_none());
    assert!(net.children().is_empty());

    // Reparenting a flat node is reported, not raised; nothing changes.
    net.set_parent(Some(group.as_ref()));
    assert_eq!(net.current_path().as_deref(), Some("net"));
}

// ========== TEST: reparent_cycle_is_refused ==========
#[test]
fn test_reparent_cycle_is_refused() {
    init_tracing();
    let s = session();
    let outer = s.create("group", Some("outer")).unwrap();
    let inner = s.create("group", Some("inner")).unwrap();
    inner.set_parent(Some(outer.as_ref()));

    // Parenting a node under its own descendant is refused with a warning.
    outer.set_parent(Some(inner.as_ref()));
    assert_eq!(outer.current_path().as_deref(), Some("|outer"));
    assert_eq!(inner.current_path().as_deref(), Some("|outer|inner"));
}
