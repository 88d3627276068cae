//! Safe mutation protocol scenarios.

use scenekit_core::Value;
use scenekit_tests::{init_tracing, session};

// ========== TEST: single_delete_protects_entangled_helpers ==========
#[test]
fn test_single_delete_protects_entangled_helpers() {
    init_tracing();
    let s = session();
    let target = s.create("network", Some("target")).unwrap();
    let helper = s.create("converter", Some("helper")).unwrap();
    helper.attr("output").connect_to(&target.attr("state"));

    // Deleting through the raw service would cascade into the helper.
    // The protocol locks it for the duration and restores its state.
    s.delete(&target);

    assert!(!target.exists());
    assert!(helper.exists());
    assert!(!helper.is_locked());
}

// ========== TEST: peer_lock_state_restored_exactly ==========
#[test]
fn test_peer_lock_state_restored_exactly() {
    init_tracing();
    let s = session();
    let target = s.create("network", Some("target")).unwrap();
    let locked_peer = s.create("network", Some("lockedPeer")).unwrap();
    let open_peer = s.create("converter", Some("openPeer")).unwrap();
    locked_peer.attr("message").connect_to(&target.attr("label"));
    open_peer.attr("output").connect_to(&target.attr("state"));
    locked_peer.lock(true);

    s.delete(&target);

    assert!(!target.exists());
    assert!(locked_peer.exists() && locked_peer.is_locked());
    assert!(open_peer.exists() && !open_peer.is_locked());
}

// ========== TEST: batch_delete_opts_out_of_peer_protection ==========
#[test]
fn test_batch_delete_opts_out_of_peer_protection() {
    init_tracing();
    let s = session();
    let a = s.create("network", Some("a")).unwrap();
    let b = s.create("network", Some("b")).unwrap();
    let helper = s.create("converter", Some("helper")).unwrap();
    helper.attr("output").connect_to(&a.attr("state"));
    a.lock(true);

    // Force-unlocks members, one atomic delete, no peer restoration.
    s.delete_many(&[a.clone(), b.clone()]);

    assert!(!a.exists());
    assert!(!b.exists());
    assert!(!helper.exists());
}

// ========== TEST: deep_hierarchy_deletes_child_first ==========
#[test]
fn test_deep_hierarchy_deletes_child_first() {
    init_tracing();
    let s = session();

    // Deeper than the recursion bound, to exercise the cascading fallback.
    let root = s.create("group", Some("level0")).unwrap();
    let mut parent = root.clone();
    for depth in 1..200 {
        let child = s.create("group", Some(&format!("level{}", depth))).unwrap();
        child.set_parent(Some(parent.as_ref()));
        parent = child;
    }

    s.delete(&root);
    assert!(!root.exists());
    assert!(!parent.exists());
    assert!(s.nodes().is_empty());
}

// ========== TEST: locked_attribute_values_survive_protocol ==========
#[test]
fn test_locked_attribute_values_survive_protocol() {
    init_tracing();
    let s = session();
    let keeper = s.create("group", Some("keeper")).unwrap();
    let doomed = s.create("network", Some("doomed")).unwrap();
    doomed.attr("message").connect_to(&keeper.attr("message"));

    keeper.attr("tx").set(Value::Float(7.0));
    keeper.attr("tx").lock(true);

    s.delete(&doomed);

    // The surviving peer's data and attribute locks are untouched.
    assert!(keeper.exists());
    assert_eq!(keeper.attr("tx").get().as_float(), Some(7.0));
    assert!(keeper.attr("tx").is_locked());
    assert!(!keeper.is_locked());
}
