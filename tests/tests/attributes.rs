//! Attribute proxy and value resolution scenarios.

use pretty_assertions::assert_eq;
use scenekit_core::{AttrSpec, Value};
use scenekit_tests::{init_tracing, session};

// ========== TEST: scalar_set_then_get_returns_value ==========
#[test]
fn test_scalar_set_then_get_returns_value() {
    init_tracing();
    let s = session();
    let n = s.create("group", Some("n")).unwrap();

    n.attr("tx").set(5.0);
    assert_eq!(n.attr("tx").get().as_float(), Some(5.0));

    n.attr("visibility").set(false);
    assert_eq!(n.attr("visibility").get().as_bool(), Some(false));

    n.attr("sx").set(2).set(3);
    assert_eq!(n.attr("sx").get().as_float(), Some(3.0));
}

// ========== TEST: locked_attr_set_scenario ==========
#[test]
fn test_locked_attr_set_scenario() {
    init_tracing();
    let s = session();
    let x = s.create("group", Some("x")).unwrap();
    let tx = x.attr("tx");

    tx.lock(true);
    tx.set(5.0);

    assert!(tx.is_locked());
    assert_eq!(tx.get().as_float(), Some(5.0));
}

// ========== TEST: lock_state_preserved_on_failed_set ==========
#[test]
fn test_lock_state_preserved_on_failed_set() {
    init_tracing();
    let s = session();
    let x = s.create("group", Some("x")).unwrap();
    let tx = x.attr("tx");
    tx.set(1.0).lock(true);

    // Kind mismatch: reported, aborted, lock reverted.
    tx.set("five");
    assert!(tx.is_locked());
    assert_eq!(tx.get().as_float(), Some(1.0));

    // Unlocked slots stay unlocked through a failure too.
    let ty = x.attr("ty");
    ty.set("nope");
    assert!(!ty.is_locked());
}

// ========== TEST: missing_attr_reads_absent_and_chains ==========
#[test]
fn test_missing_attr_reads_absent_and_chains() {
    init_tracing();
    let s = session();
    let n = s.create("network", Some("n")).unwrap();

    assert!(n.attr("ghost").get().is_absent());
    // The receiver stays usable through reported failures.
    n.attr("ghost").set(1.0).lock(true).set(2.0);
    assert!(!n.attr("ghost").exists());
}

// ========== TEST: dynamic_attr_lifecycle ==========
#[test]
fn test_dynamic_attr_lifecycle() {
    init_tracing();
    let s = session();
    let n = s.create("network", Some("n")).unwrap();

    let weight = n.add_attr(AttrSpec::float("weight").with_default(1.0)).unwrap();
    assert_eq!(weight.get().as_float(), Some(1.0));
    weight.set(0.25);
    assert_eq!(weight.get().as_float(), Some(0.25));

    let renamed = weight.rename("influence");
    assert_eq!(renamed.attr_path(), "influence");
    assert!(!n.attr("weight").exists());
    assert_eq!(renamed.get().as_float(), Some(0.25));

    renamed.delete();
    assert!(!renamed.exists());
}

// ========== TEST: rename_locked_attr_preserves_lock ==========
#[test]
fn test_rename_locked_attr_preserves_lock() {
    init_tracing();
    let s = session();
    let n = s.create("network", Some("n")).unwrap();
    let attr = n.add_attr(AttrSpec::float("custom")).unwrap();
    attr.lock(true);

    // Success: the new path is locked, the old name is gone.
    let renamed = attr.rename("shiny");
    assert!(renamed.is_locked());
    assert!(!n.attr("custom").exists());

    // Failure (built-in): original path returned, lock restored.
    let label = n.attr("label");
    label.lock(true);
    let unchanged = label.rename("relabeled");
    assert_eq!(unchanged.attr_path(), "label");
    assert!(unchanged.is_locked());
    assert!(!n.attr("relabeled").exists());
}

// ========== TEST: delete_locked_builtin_restores_lock ==========
#[test]
fn test_delete_locked_builtin_restores_lock() {
    init_tracing();
    let s = session();
    let n = s.create("group", Some("n")).unwrap();
    let tx = n.attr("tx");
    tx.lock(true);

    tx.delete();
    assert!(tx.exists());
    assert!(tx.is_locked());
}

// ========== TEST: array_cardinality_resolution ==========
#[test]
fn test_array_cardinality_resolution() {
    init_tracing();
    let s = session();
    let n = s.create("adder", Some("sum")).unwrap();
    let values = n.attr("values");

    // 0 populated indices: absent.
    assert!(values.get().is_absent());

    // The cardinality probe materialized index 0; 1 index reads as a scalar.
    assert_eq!(values.get().as_float(), Some(0.0));

    // N >= 2: ordered sequence, ascending index order, sparse indices kept.
    values.index(0).set(1.5);
    values.index(7).set(8.5);
    let read = values.get();
    let seq = read.as_sequence().expect("sequence of per-index values");
    assert_eq!(seq, &[Value::Float(1.5), Value::Float(8.5)][..]);
}

// ========== TEST: compound_reads_one_level_in_declared_order ==========
#[test]
fn test_compound_reads_one_level_in_declared_order() {
    init_tracing();
    let s = session();
    let n = s.create("group", Some("n")).unwrap();

    n.attr("pivot").child("pivotZ").set(9.0);
    let read = n.attr("pivot").get();
    let items = read.as_compound().expect("compound items");
    let floats: Vec<_> = items.iter().map(|i| i.as_float().unwrap()).collect();
    assert_eq!(floats, [0.0, 0.0, 9.0]);
}

// ========== TEST: indexed_element_reads ==========
#[test]
fn test_indexed_element_reads() {
    init_tracing();
    let s = session();
    let n = s.create("adder", Some("sum")).unwrap();

    n.attr("values").index(3).set(4.0);
    assert_eq!(n.attr("values").index(3).get().as_float(), Some(4.0));
    // An unpopulated element is absent, not an error.
    assert!(n.attr("values").index(9).get().is_absent());
}
