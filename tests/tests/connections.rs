//! Connection scenarios: idempotence, direction, and reference resolution.

use scenekit_core::Direction;
use scenekit_tests::{init_tracing, session};
use std::sync::Arc;

// ========== TEST: connect_twice_yields_one_edge ==========
#[test]
fn test_connect_twice_yields_one_edge() {
    init_tracing();
    let s = session();
    let a = s.create("network", Some("a")).unwrap();
    let b = s.create("network", Some("b")).unwrap();

    a.attr("message").connect_to(&b.attr("label"));
    a.attr("message").connect_to(&b.attr("label"));

    let incoming = s
        .scene()
        .connections("b", "label", Direction::Incoming);
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].from.node_path, "a");
}

// ========== TEST: connect_from_mirrors_connect_to ==========
#[test]
fn test_connect_from_mirrors_connect_to() {
    init_tracing();
    let s = session();
    let a = s.create("network", Some("a")).unwrap();
    let b = s.create("network", Some("b")).unwrap();

    b.attr("label").connect_from(&a.attr("message"));
    let read = b.attr("label").get();
    assert!(Arc::ptr_eq(read.as_node().unwrap(), &a));
}

// ========== TEST: disconnect_removes_only_requested_direction ==========
#[test]
fn test_disconnect_removes_only_requested_direction() {
    init_tracing();
    let s = session();
    let mid = s.create("network", Some("mid")).unwrap();
    let upstream = s.create("network", Some("up")).unwrap();
    let downstream = s.create("network", Some("down")).unwrap();

    // up.message -> mid.message -> down.label
    upstream.attr("message").connect_to(&mid.attr("message"));
    mid.attr("message").connect_to(&downstream.attr("label"));

    // Dropping incoming edges leaves the outgoing one alone.
    mid.attr("message").disconnect(Direction::Incoming);
    assert!(s
        .scene()
        .connections("mid", "message", Direction::Incoming)
        .is_empty());
    assert_eq!(
        s.scene()
            .connections("mid", "message", Direction::Outgoing)
            .len(),
        1
    );

    // Disconnecting a direction with no edges is a no-op.
    mid.attr("message").disconnect(Direction::Incoming);
    assert_eq!(
        s.scene()
            .connections("mid", "message", Direction::Outgoing)
            .len(),
        1
    );

    mid.attr("message").disconnect(Direction::Outgoing);
    assert!(s
        .scene()
        .connections("mid", "message", Direction::Both)
        .is_empty());
}

// ========== TEST: incompatible_endpoints_reported_not_raised ==========
#[test]
fn test_incompatible_endpoints_reported_not_raised() {
    init_tracing();
    let s = session();
    let a = s.create("network", Some("a")).unwrap();
    let b = s.create("network", Some("b")).unwrap();

    // Enum into string: refused with a warning, receiver still chainable.
    a.attr("state").connect_to(&b.attr("label")).lock(false);
    assert!(s
        .scene()
        .connections("b", "label", Direction::Incoming)
        .is_empty());
}

// ========== TEST: multi_reference_scenario_ordered_sequence ==========
#[test]
fn test_multi_reference_scenario_ordered_sequence() {
    init_tracing();
    let s = session();
    let x = s.create("collector", Some("x")).unwrap();
    let y = s.create("network", Some("y")).unwrap();
    let z = s.create("network", Some("z")).unwrap();

    y.attr("message").connect_to(&x.attr("target").index(0));
    z.attr("message").connect_to(&x.attr("target").index(1));

    let read = x.attr("target").get();
    let peers = read.as_nodes().expect("ordered sequence of entities");
    assert_eq!(peers.len(), 2);
    assert!(Arc::ptr_eq(&peers[0], &y));
    assert!(Arc::ptr_eq(&peers[1], &z));
}

// ========== TEST: node_level_connections_wrap_peers ==========
#[test]
fn test_node_level_connections_wrap_peers() {
    init_tracing();
    let s = session();
    let hub = s.create("network", Some("hub")).unwrap();
    let a = s.create("network", Some("a")).unwrap();
    let b = s.create("collector", Some("b")).unwrap();

    a.attr("message").connect_to(&hub.attr("label"));
    hub.attr("message").connect_to(&b.attr("target").index(0));

    let peers = hub.connections();
    assert_eq!(peers.len(), 2);
    assert!(Arc::ptr_eq(&peers[0], &a));
    assert!(Arc::ptr_eq(&peers[1], &b));
}
