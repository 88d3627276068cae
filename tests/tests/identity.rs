//! Identity registry and handle resolution scenarios.

use scenekit_tests::{init_tracing, session};
use std::sync::Arc;

// ========== TEST: repeated_lookup_returns_identical_wrapper ==========
#[test]
fn test_repeated_lookup_returns_identical_wrapper() {
    init_tracing();
    let s = session();
    let made = s.create("group", Some("rig")).unwrap();

    let by_name = s.get("rig").unwrap();
    let by_full_path = s.get("|rig").unwrap();
    let by_id = s.by_uuid(made.uuid().unwrap()).unwrap();

    assert!(Arc::ptr_eq(&made, &by_name));
    assert!(Arc::ptr_eq(&made, &by_full_path));
    assert!(Arc::ptr_eq(&made, &by_id));
}

// ========== TEST: unreachable_wrapper_is_reclaimed_then_rebuilt ==========
#[test]
fn test_unreachable_wrapper_is_reclaimed_then_rebuilt() {
    init_tracing();
    let s = session();
    let first = s.create("network", Some("n")).unwrap();
    let uuid = first.uuid().unwrap();

    // While a strong reference exists the registry serves it.
    assert!(Arc::ptr_eq(&first, &s.get("n").unwrap()));

    drop(first);
    assert!(s.cache_snapshot().is_empty());

    // A later lookup builds a fresh wrapper, re-synchronized to the entity.
    let rebuilt = s.get("n").unwrap();
    assert_eq!(rebuilt.uuid(), Some(uuid));
    assert!(rebuilt.exists());
}

// ========== TEST: rename_keeps_identity_and_recovers_path ==========
#[test]
fn test_rename_keeps_identity_and_recovers_path() {
    init_tracing();
    let s = session();
    let node = s.create("group", Some("before")).unwrap();
    let uuid = node.uuid().unwrap();

    // Rename through the external service, behind the wrapper's back: the
    // cached native handle goes stale and must be re-resolved via uuid.
    s.scene().rename_node("|before", "after").unwrap();

    assert_eq!(node.current_path().as_deref(), Some("|after"));
    assert_eq!(node.uuid(), Some(uuid));
    assert!(Arc::ptr_eq(&node, &s.get("after").unwrap()));
}

// ========== TEST: reparent_keeps_identity ==========
#[test]
fn test_reparent_keeps_identity() {
    init_tracing();
    let s = session();
    let root = s.create("group", Some("root")).unwrap();
    let child = s.create("group", Some("kid")).unwrap();

    s.scene().reparent("|kid", Some("|root")).unwrap();

    assert_eq!(child.current_path().as_deref(), Some("|root|kid"));
    assert!(Arc::ptr_eq(&child, &s.get("|root|kid").unwrap()));
    assert!(Arc::ptr_eq(&child.parent().unwrap(), &root));
}

// ========== TEST: external_deletion_absents_without_eviction ==========
#[test]
fn test_external_deletion_absents_without_eviction() {
    init_tracing();
    let s = session();
    let node = s.create("network", Some("doomed")).unwrap();
    let uuid = node.uuid().unwrap();

    s.scene().delete_node("doomed").unwrap();

    // Absent, uniformly: deleted and never-existed look the same.
    assert!(!node.exists());
    assert_eq!(node.current_path(), None);
    assert_eq!(node.name(), None);
    // The registry entry survives until reclamation or explicit eviction.
    assert!(s.cache_snapshot().contains_key(&uuid));
    // The id no longer resolves to a fresh wrapper.
    assert!(s.by_uuid(uuid).map(|n| !n.exists()).unwrap_or(true));
}

// ========== TEST: uuid_does_not_survive_recreate ==========
#[test]
fn test_uuid_does_not_survive_recreate() {
    init_tracing();
    let s = session();
    let node = s.create("network", Some("n")).unwrap();
    let old_uuid = node.uuid().unwrap();

    s.scene().delete_node("n").unwrap();
    let recreated = s.create("network", Some("n")).unwrap();

    assert_ne!(recreated.uuid(), Some(old_uuid));
    assert!(!Arc::ptr_eq(&node, &recreated));
    // The stale wrapper stays absent even though the name resolves again.
    assert!(!node.exists());
    assert!(recreated.exists());
}

// ========== TEST: registries_are_injectable_and_independent ==========
#[test]
fn test_registries_are_injectable_and_independent() {
    init_tracing();
    let s1 = session();
    let s2 = session();
    let a = s1.create("group", Some("a")).unwrap();
    let b = s2.create("group", Some("a")).unwrap();

    // Same name, different scenes, different registries: unrelated wrappers.
    assert!(!Arc::ptr_eq(&a, &b));
    assert_ne!(a.uuid(), b.uuid());
    assert_eq!(s1.cache_snapshot().len(), 1);
    assert_eq!(s2.cache_snapshot().len(), 1);
}
