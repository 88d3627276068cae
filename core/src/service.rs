//! The seam between this library and the external graph service.
//!
//! The service owns all entity, attribute, and connection state; this crate
//! only defines the operations consumed by the object layer. Implementations
//! are synchronous request/response with no background work, and mutation is
//! expected from one logical owner at a time.

use crate::{AttrKind, AttrSpec, Direction, NativeHandle, ResolvedHandle, SceneResult, SceneUuid, Value};
use std::fmt;

/// One endpoint of a connection: a node path plus an attribute path relative
/// to that node (for example `"|rig|arm"` and `"target[1]"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlugRef {
    pub node_path: String,
    pub attr_path: String,
}

impl PlugRef {
    pub fn new(node_path: impl Into<String>, attr_path: impl Into<String>) -> Self {
        Self {
            node_path: node_path.into(),
            attr_path: attr_path.into(),
        }
    }
}

impl fmt::Display for PlugRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_path, self.attr_path)
    }
}

/// A directed edge between two attribute plugs. Never cached in-process;
/// services report the current edge set on every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: PlugRef,
    pub to: PlugRef,
}

impl Connection {
    pub fn new(from: PlugRef, to: PlugRef) -> Self {
        Self { from, to }
    }

    /// The endpoint that is not on `node_path`, if the edge touches it.
    pub fn peer_of(&self, node_path: &str) -> Option<&PlugRef> {
        if self.to.node_path == node_path {
            Some(&self.from)
        } else if self.from.node_path == node_path {
            Some(&self.to)
        } else {
            None
        }
    }
}

/// Operations this library consumes from the external graph service.
///
/// Lookup methods return `Option`/empty collections for entities that do not
/// currently resolve; `Err` is reserved for rejected mutations and
/// construction errors. Every path argument refers to the entity's *current*
/// path — callers re-derive paths through persistent ids when handles go
/// stale.
pub trait SceneService: Send + Sync {
    // ==================== Existence & Resolution ====================

    /// Check whether a node path currently resolves.
    fn node_exists(&self, path: &str) -> bool;

    /// Check whether an attribute path currently resolves on a node.
    fn attr_exists(&self, node: &str, attr: &str) -> bool;

    /// Resolve a current path to a native handle, classifying the entity as
    /// hierarchical or flat.
    fn resolve(&self, path: &str) -> Option<ResolvedHandle>;

    /// Check whether a previously issued handle is still current.
    fn handle_valid(&self, handle: NativeHandle) -> bool;

    /// Current full path behind a handle, if the handle is still current.
    fn path_of(&self, handle: NativeHandle) -> Option<String>;

    /// Persistent identifier of the node at `path`.
    fn uuid_of(&self, path: &str) -> Option<SceneUuid>;

    /// Current full path of the node carrying `uuid`.
    fn path_from_uuid(&self, uuid: SceneUuid) -> Option<String>;

    // ==================== Nodes ====================

    /// Create a node of `node_type`, optionally requesting a name. The
    /// service may uniquify the requested name; the path actually assigned is
    /// returned. Identity is resolved from that path in a second step.
    fn create_node(&self, node_type: &str, requested_name: Option<&str>) -> SceneResult<String>;

    /// Delete the node at `path`. For hierarchical nodes this cascades over
    /// the whole subtree. Refused for locked nodes.
    fn delete_node(&self, path: &str) -> SceneResult<()>;

    /// Atomically delete several nodes: either all paths resolve and are
    /// deleted, or nothing is.
    fn delete_many(&self, paths: &[String]) -> SceneResult<()>;

    /// Rename the node at `path`; returns its new full path.
    fn rename_node(&self, path: &str, new_name: &str) -> SceneResult<String>;

    /// Type name of the node at `path`.
    fn node_type(&self, path: &str) -> Option<String>;

    /// Current full paths of every node in the scene.
    fn all_nodes(&self) -> Vec<String>;

    // ==================== Hierarchy ====================

    /// Full path of the parent, for hierarchical nodes that have one.
    fn parent_of(&self, path: &str) -> Option<String>;

    /// Full paths of direct children, in order.
    fn children_of(&self, path: &str) -> Vec<String>;

    /// Full paths of all descendants, depth-first.
    fn descendants_of(&self, path: &str) -> Vec<String>;

    /// Move a hierarchical node under `new_parent` (`None` reparents to the
    /// root); returns the node's new full path.
    fn reparent(&self, path: &str, new_parent: Option<&str>) -> SceneResult<String>;

    // ==================== Locks ====================

    fn lock_node(&self, path: &str, locked: bool) -> SceneResult<()>;

    fn node_locked(&self, path: &str) -> bool;

    fn lock_attr(&self, node: &str, attr: &str, locked: bool) -> SceneResult<()>;

    fn attr_locked(&self, node: &str, attr: &str) -> bool;

    // ==================== Attributes ====================

    /// Value-kind classification of an attribute slot.
    fn attr_kind(&self, node: &str, attr: &str) -> Option<AttrKind>;

    /// Whether the slot has array cardinality.
    fn attr_is_multi(&self, node: &str, attr: &str) -> bool;

    /// Count of currently populated indices (1 for plain slots).
    ///
    /// Probing an unpopulated array-capable attribute may materialize index 0
    /// as a side effect; callers must probe once and branch on that single
    /// outcome rather than probing again.
    fn attr_cardinality(&self, node: &str, attr: &str) -> usize;

    /// Populated indices in ascending order (empty for plain slots).
    fn attr_indices(&self, node: &str, attr: &str) -> Vec<usize>;

    /// Names of the node's top-level attributes, declared order first.
    fn list_attrs(&self, node: &str) -> Vec<String>;

    /// Child names of a compound slot, in declared order.
    fn sub_attrs(&self, node: &str, attr: &str) -> Vec<String>;

    /// Add a dynamic attribute to one node.
    fn add_attr(&self, node: &str, spec: AttrSpec) -> SceneResult<()>;

    /// Delete a (removable, unlocked) top-level attribute.
    fn delete_attr(&self, node: &str, attr: &str) -> SceneResult<()>;

    /// Rename a dynamic top-level attribute.
    fn rename_attr(&self, node: &str, attr: &str, new_name: &str) -> SceneResult<()>;

    // ==================== Values ====================

    /// Read the literal value at an attribute path (optionally indexed, e.g.
    /// `"values[2]"`). Reading an array slot without an index reads the
    /// lowest populated element.
    fn get_scalar(&self, node: &str, attr: &str) -> SceneResult<Value>;

    /// Write the literal value at an attribute path. Refused for locked slots
    /// and kind mismatches.
    fn set_scalar(&self, node: &str, attr: &str, value: Value) -> SceneResult<()>;

    // ==================== Connections ====================

    /// Edges touching `node.attr`, filtered by direction relative to that
    /// plug. Element plugs of a multi attribute match their parent attribute
    /// path; results come back in ascending element order.
    fn connections(&self, node: &str, attr: &str, direction: Direction) -> Vec<Connection>;

    /// Edges touching any attribute of `node`, filtered by direction.
    fn node_connections(&self, node: &str, direction: Direction) -> Vec<Connection>;

    /// Check whether the exact edge `from -> to` exists.
    fn connected(&self, from: &PlugRef, to: &PlugRef) -> bool;

    /// Create the edge `from -> to`. An existing incoming edge on `to` is
    /// replaced. Refused for incompatible endpoint kinds.
    fn connect(&self, from: &PlugRef, to: &PlugRef) -> SceneResult<()>;

    /// Remove the exact edge `from -> to`; no-op if it does not exist.
    fn disconnect(&self, from: &PlugRef, to: &PlugRef) -> SceneResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plug_display() {
        let plug = PlugRef::new("|root|arm", "target[1]");
        assert_eq!(plug.to_string(), "|root|arm.target[1]");
    }

    #[test]
    fn test_connection_peer() {
        let conn = Connection::new(PlugRef::new("a", "out"), PlugRef::new("b", "in"));
        assert_eq!(conn.peer_of("b"), Some(&PlugRef::new("a", "out")));
        assert_eq!(conn.peer_of("a"), Some(&PlugRef::new("b", "in")));
        assert_eq!(conn.peer_of("c"), None);
    }
}
