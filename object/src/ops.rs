//! Lock-preserving deletion.
//!
//! Hosts cascade a node deletion into connected helper entities, which can
//! silently destroy nodes the caller never asked to remove. [`delete_node`]
//! locks every connected peer for the duration of the delete and restores
//! each peer's prior lock state afterwards, whatever the outcome.
//! [`delete_many`] is the explicit opt-out: force-unlock everything and issue
//! one atomic delete.

use crate::node::SceneNode;
use std::sync::Arc;
use tracing::warn;

/// Recursion bound for child-first deletion of deep hierarchies. When
/// exhausted, the remaining subtree goes through one cascading service
/// delete instead.
const MAX_DELETE_DEPTH: usize = 128;

/// Delete one entity, protecting connected peers.
///
/// Hierarchical nodes delete their children first, recursively, so every
/// level gets peer protection; flat nodes (and exhausted recursion) go
/// straight to the protected single delete.
pub fn delete_node(node: &SceneNode) {
    delete_with_depth(node, MAX_DELETE_DEPTH);
}

fn delete_with_depth(node: &SceneNode, depth: usize) {
    let Some(path) = node.current_path() else {
        warn!(node = %node, "invalid object");
        return;
    };
    if depth > 0 && node.is_hierarchical() {
        for child in node.children() {
            delete_with_depth(&child, depth - 1);
        }
    }
    protected_delete(node, &path);
}

/// Lock all connected peers, force-unlock and delete the target, then
/// restore each peer's prior lock state regardless of outcome.
fn protected_delete(node: &SceneNode, path: &str) {
    let scene = node.scene().clone();
    let peers = node.connections();
    let lock_states: Vec<bool> = peers.iter().map(|p| p.is_locked()).collect();
    for peer in &peers {
        peer.lock(true);
    }
    node.lock(false);

    let result = scene.delete_node(path);

    for (peer, was_locked) in peers.iter().zip(lock_states) {
        peer.lock(was_locked);
    }
    match result {
        Ok(()) => node.clear_cached_handle(),
        Err(err) => warn!(node = %path, %err, "delete failed"),
    }
}

/// Force-unlock every member and issue one atomic delete. Peer lock state is
/// deliberately not saved or restored: batch removal opts out of peer
/// protection.
pub fn delete_many(nodes: &[Arc<SceneNode>]) {
    let Some(first) = nodes.first() else {
        return;
    };
    let scene = first.scene().clone();

    let mut paths = Vec::new();
    for node in nodes {
        match node.current_path() {
            Some(path) => {
                node.lock(false);
                paths.push(path);
            }
            None => warn!(node = %node, "invalid object"),
        }
    }
    if paths.is_empty() {
        return;
    }
    match scene.delete_many(&paths) {
        Ok(()) => {
            for node in nodes {
                node.clear_cached_handle();
            }
        }
        Err(err) => warn!(%err, "batch delete failed"),
    }
}
