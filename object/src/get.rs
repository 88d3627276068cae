//! Classification-driven attribute reads.
//!
//! `AttrPath::get` delegates here. The attribute's value-kind picks the read
//! strategy: references resolve to connected entity wrappers, connectable
//! strings prefer their connection over the literal text, compounds enumerate
//! one level of sub-slots, and scalars branch on array cardinality.

use crate::node::SceneNode;
use scenekit_core::{AttrKind, Direction, Value};
use std::sync::Arc;
use tracing::warn;

/// Result of resolving an attribute path.
#[derive(Debug, Clone)]
pub enum AttrValue {
    /// The attribute, its value, or its connection does not currently exist.
    Absent,
    /// A single literal value.
    Scalar(Value),
    /// Per-index values of an array slot, ascending index order.
    Sequence(Vec<Value>),
    /// The entity connected to a singular reference slot.
    Node(Arc<SceneNode>),
    /// Entities connected to an array-capable reference slot, in order.
    Nodes(Vec<Arc<SceneNode>>),
    /// Resolved sub-slots of a compound, in declared order.
    Compound(Vec<AttrValue>),
}

impl AttrValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, AttrValue::Absent)
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            AttrValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Scalar shortcut: the value as a float when it is one.
    pub fn as_float(&self) -> Option<f64> {
        self.as_scalar().and_then(Value::as_float)
    }

    /// Scalar shortcut: the value as a bool when it is one.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    /// Scalar shortcut: the value as text when it is text.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            AttrValue::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Arc<SceneNode>> {
        match self {
            AttrValue::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_nodes(&self) -> Option<&[Arc<SceneNode>]> {
        match self {
            AttrValue::Nodes(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::Compound(v) => Some(v),
            _ => None,
        }
    }
}

/// Resolve `node_path.attr`, which the caller has already existence-checked.
pub(crate) fn resolve(node: &Arc<SceneNode>, node_path: &str, attr: &str) -> AttrValue {
    let Some(kind) = node.scene().attr_kind(node_path, attr) else {
        warn!(attr = %format!("{}.{}", node_path, attr), "invalid attribute");
        return AttrValue::Absent;
    };
    resolve_kind(node, node_path, attr, kind)
}

fn resolve_kind(node: &Arc<SceneNode>, node_path: &str, attr: &str, kind: AttrKind) -> AttrValue {
    match kind {
        AttrKind::Reference => read_reference(node, node_path, attr),
        AttrKind::Text => read_text(node, node_path, attr),
        AttrKind::Compound => read_compound(node, node_path, attr),
        AttrKind::Scalar(_) => read_scalar(node, node_path, attr),
    }
}

/// Reference slots resolve to the connected entities. Array-capable slots
/// yield the full ordered set; singular slots prefer the incoming edge and
/// fall back to the outgoing one.
fn read_reference(node: &Arc<SceneNode>, node_path: &str, attr: &str) -> AttrValue {
    let scene = node.scene();
    if scene.attr_is_multi(node_path, attr) {
        return AttrValue::Nodes(connected_peers(node, node_path, attr, Direction::Both));
    }
    for direction in [Direction::Incoming, Direction::Outgoing] {
        if let Some(peer) = connected_peers(node, node_path, attr, direction).into_iter().next() {
            return AttrValue::Node(peer);
        }
    }
    AttrValue::Absent
}

/// String slots can alternatively carry a connection; when one exists it
/// takes precedence over the literal content.
fn read_text(node: &Arc<SceneNode>, node_path: &str, attr: &str) -> AttrValue {
    let scene = node.scene();
    if scene.attr_is_multi(node_path, attr) {
        let peers = connected_peers(node, node_path, attr, Direction::Both);
        if !peers.is_empty() {
            return AttrValue::Nodes(peers);
        }
    } else {
        for direction in [Direction::Incoming, Direction::Outgoing] {
            if let Some(peer) =
                connected_peers(node, node_path, attr, direction).into_iter().next()
            {
                return AttrValue::Node(peer);
            }
        }
    }
    match scene.get_scalar(node_path, attr) {
        Ok(v) => AttrValue::Scalar(v),
        Err(err) => {
            warn!(attr = %format!("{}.{}", node_path, attr), %err, "read failed");
            AttrValue::Absent
        }
    }
}

/// Compounds enumerate each named sub-slot in declared order. Resolution
/// stops at one compound level: nested compound children are skipped so the
/// result shape stays predictable.
fn read_compound(node: &Arc<SceneNode>, node_path: &str, attr: &str) -> AttrValue {
    let scene = node.scene();
    let mut items = Vec::new();
    for sub in scene.sub_attrs(node_path, attr) {
        let child_attr = format!("{}.{}", attr, sub);
        let Some(kind) = scene.attr_kind(node_path, &child_attr) else {
            continue;
        };
        if kind.is_compound() {
            continue;
        }
        items.push(resolve_kind(node, node_path, &child_attr, kind));
    }
    AttrValue::Compound(items)
}

/// Scalars branch on array cardinality. The probe runs exactly once: on some
/// hosts it materializes index 0 of an untouched array slot as a side
/// effect, so its outcome — not a second probe — picks the branch.
fn read_scalar(node: &Arc<SceneNode>, node_path: &str, attr: &str) -> AttrValue {
    let scene = node.scene();
    let count = scene.attr_cardinality(node_path, attr);
    let multi = scene.attr_is_multi(node_path, attr);

    if multi && count == 0 {
        return AttrValue::Absent;
    }
    if count <= 1 {
        return match scene.get_scalar(node_path, attr) {
            Ok(v) => AttrValue::Scalar(v),
            Err(err) => {
                warn!(attr = %format!("{}.{}", node_path, attr), %err, "read failed");
                AttrValue::Absent
            }
        };
    }

    let mut values = Vec::new();
    for i in scene.attr_indices(node_path, attr) {
        let element = format!("{}[{}]", attr, i);
        match scene.get_scalar(node_path, &element) {
            Ok(v) => values.push(v),
            // Element read failed: fall back to the whole path as a unit.
            Err(_) => match scene.get_scalar(node_path, attr) {
                Ok(v) => values.push(v),
                Err(err) => {
                    warn!(attr = %format!("{}.{}", node_path, element), %err, "read failed");
                }
            },
        }
    }
    AttrValue::Sequence(values)
}

fn connected_peers(
    node: &Arc<SceneNode>,
    node_path: &str,
    attr: &str,
    direction: Direction,
) -> Vec<Arc<SceneNode>> {
    let scene = node.scene().clone();
    let mut out = Vec::new();
    for conn in scene.connections(node_path, attr, direction) {
        let Some(peer) = conn.peer_of(node_path) else {
            continue;
        };
        out.push(SceneNode::attach(
            scene.clone(),
            node.registry(),
            &peer.node_path,
        ));
    }
    out
}
