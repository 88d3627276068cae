//! The entity wrapper.
//!
//! A [`SceneNode`] represents one external node. It owns at most one cached
//! native handle at a time; when the host invalidates the handle (rename,
//! reparent, undo churn), the next use re-resolves it through the persistent
//! id. If the id itself no longer resolves, the wrapper is absent — every
//! accessor then reports `None` rather than failing.

use crate::attr::AttrPath;
use crate::ops;
use crate::registry::NodeRegistry;
use parking_lot::Mutex;
use scenekit_core::{
    AttrSpec, Direction, ResolvedHandle, SceneError, SceneResult, SceneService, SceneUuid,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// In-process, identity-stable wrapper for one external node.
pub struct SceneNode {
    scene: Arc<dyn SceneService>,
    registry: NodeRegistry,
    /// Persistent id, carried once resolution succeeded at construction.
    uuid: Option<SceneUuid>,
    /// Name given at construction, kept for diagnostics only.
    requested: String,
    /// Cached native handle; `None` until (re)resolved.
    handle: Mutex<Option<ResolvedHandle>>,
    /// Back-reference to the owning `Arc`, so attribute paths can share the
    /// wrapper. Always upgradable while any method runs.
    self_ref: Weak<SceneNode>,
}

impl SceneNode {
    /// Wrap the node currently at `path`.
    ///
    /// When the path resolves, the wrapper is registered under its persistent
    /// id and any existing live wrapper for that id is returned instead. When
    /// it does not resolve, an unregistered, permanently absent wrapper is
    /// returned; only a malformed (empty) name is an error.
    pub fn open(
        scene: Arc<dyn SceneService>,
        registry: &NodeRegistry,
        path: &str,
    ) -> SceneResult<Arc<SceneNode>> {
        if path.is_empty() {
            return Err(SceneError::InvalidName(path.to_string()));
        }
        Ok(Self::attach(scene, registry, path))
    }

    /// Create a node of `node_type` in the scene, then wrap it.
    ///
    /// Creation is two-step: the service picks the final name (uniquifying a
    /// requested one), and identity is resolved from the path it returns. An
    /// unrecognized type is a programmer error and fails.
    pub fn create(
        scene: Arc<dyn SceneService>,
        registry: &NodeRegistry,
        node_type: &str,
        requested_name: Option<&str>,
    ) -> SceneResult<Arc<SceneNode>> {
        let path = scene.create_node(node_type, requested_name)?;
        Ok(Self::attach(scene, registry, &path))
    }

    /// Wrap the node carrying `uuid`, if it still resolves.
    pub fn by_uuid(
        scene: Arc<dyn SceneService>,
        registry: &NodeRegistry,
        uuid: SceneUuid,
    ) -> Option<Arc<SceneNode>> {
        if let Some(existing) = registry.get(uuid) {
            return Some(existing);
        }
        let path = scene.path_from_uuid(uuid)?;
        Some(Self::attach(scene, registry, &path))
    }

    /// Build a wrapper for `path` and register it when identity resolves.
    pub(crate) fn attach(
        scene: Arc<dyn SceneService>,
        registry: &NodeRegistry,
        path: &str,
    ) -> Arc<SceneNode> {
        let uuid = scene.uuid_of(path);
        let handle = scene.resolve(path);
        let node = Arc::new_cyclic(|weak| SceneNode {
            scene,
            registry: registry.clone(),
            uuid,
            requested: path.to_string(),
            handle: Mutex::new(handle),
            self_ref: weak.clone(),
        });
        match uuid {
            Some(id) => registry.register_or_get(id, node),
            None => {
                warn!(node = path, "node does not resolve");
                node
            }
        }
    }

    pub(crate) fn scene(&self) -> &Arc<dyn SceneService> {
        &self.scene
    }

    pub(crate) fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub(crate) fn clear_cached_handle(&self) {
        *self.handle.lock() = None;
    }

    /// The owning `Arc` for this wrapper.
    fn arc(&self) -> Arc<SceneNode> {
        self.self_ref.upgrade().expect("wrapper is alive")
    }

    // ==================== Identity & Resolution ====================

    /// Persistent id, when construction-time resolution succeeded.
    pub fn uuid(&self) -> Option<SceneUuid> {
        self.uuid
    }

    /// Current full path.
    ///
    /// Re-resolves through the persistent id when the cached handle has gone
    /// stale. `None` uniformly means "deleted or never existed".
    pub fn current_path(&self) -> Option<String> {
        let uuid = self.uuid?;
        let mut cached = self.handle.lock();
        if let Some(resolved) = *cached {
            if self.scene.handle_valid(resolved.handle()) {
                return self.scene.path_of(resolved.handle());
            }
            debug!(node = %self.requested, "cached handle went stale");
            *cached = None;
        }
        let path = self.scene.path_from_uuid(uuid)?;
        *cached = self.scene.resolve(&path);
        Some(path)
    }

    /// Whether the entity still resolves.
    pub fn exists(&self) -> bool {
        self.current_path().is_some()
    }

    /// Whether the entity participates in the parent/child hierarchy.
    pub fn is_hierarchical(&self) -> bool {
        let _ = self.current_path();
        (*self.handle.lock())
            .map(|h| h.is_hierarchical())
            .unwrap_or(false)
    }

    /// Leaf path: the last `|`-separated path component.
    pub fn leaf_path(&self) -> Option<String> {
        self.current_path()
            .map(|p| p.rsplit('|').next().unwrap_or_default().to_string())
    }

    /// Leaf name without any namespace qualifier.
    pub fn name(&self) -> Option<String> {
        self.leaf_path()
            .map(|leaf| leaf.rsplit(':').next().unwrap_or_default().to_string())
    }

    /// Namespace qualifier of the leaf name, empty when unqualified.
    pub fn namespace(&self) -> Option<String> {
        self.leaf_path().map(|leaf| match leaf.rfind(':') {
            Some(pos) => leaf[..pos].to_string(),
            None => String::new(),
        })
    }

    /// Node type name.
    pub fn node_type(&self) -> Option<String> {
        let path = self.current_path()?;
        self.scene.node_type(&path)
    }

    // ==================== Node Operations ====================

    /// Rename the node. Failure (locked node, bad name) is reported, not
    /// raised; the receiver stays usable either way.
    pub fn rename(&self, new_name: &str) -> &Self {
        let Some(path) = self.current_path() else {
            warn!(node = %self.requested, "invalid object");
            return self;
        };
        match self.scene.rename_node(&path, new_name) {
            Ok(new_path) => {
                *self.handle.lock() = self.scene.resolve(&new_path);
            }
            Err(err) => warn!(node = %path, %err, "rename failed"),
        }
        self
    }

    /// Lock or unlock the node.
    pub fn lock(&self, state: bool) -> &Self {
        let Some(path) = self.current_path() else {
            warn!(node = %self.requested, "invalid object");
            return self;
        };
        if let Err(err) = self.scene.lock_node(&path, state) {
            warn!(node = %path, %err, "lock failed");
        }
        self
    }

    pub fn is_locked(&self) -> bool {
        self.current_path()
            .map(|path| self.scene.node_locked(&path))
            .unwrap_or(false)
    }

    /// Delete the node through the peer-protecting protocol.
    pub fn delete(&self) {
        ops::delete_node(self);
    }

    // ==================== Attributes ====================

    /// Unchecked attribute access: always returns a path, validated lazily
    /// by the operations invoked on it.
    pub fn attr(&self, name: &str) -> AttrPath {
        AttrPath::new(self.arc(), name)
    }

    /// Paths for every attribute the node currently carries.
    pub fn attrs(&self) -> Vec<AttrPath> {
        let Some(path) = self.current_path() else {
            return Vec::new();
        };
        self.scene
            .list_attrs(&path)
            .into_iter()
            .map(|name| AttrPath::new(self.arc(), name))
            .collect()
    }

    /// Add a dynamic attribute and return its path.
    pub fn add_attr(&self, spec: AttrSpec) -> SceneResult<AttrPath> {
        let path = self
            .current_path()
            .ok_or_else(|| SceneError::NodeNotFound(self.requested.clone()))?;
        let name = spec.name.clone();
        self.scene.add_attr(&path, spec)?;
        Ok(self.attr(&name))
    }

    /// Wrappers for every node connected to any attribute of this one, in
    /// edge order, deduplicated.
    pub fn connections(&self) -> Vec<Arc<SceneNode>> {
        let Some(path) = self.current_path() else {
            warn!(node = %self.requested, "invalid object");
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for conn in self.scene.node_connections(&path, Direction::Both) {
            let Some(peer) = conn.peer_of(&path) else {
                continue;
            };
            let wrapper = Self::attach(self.scene.clone(), &self.registry, &peer.node_path);
            if let Some(id) = wrapper.uuid() {
                if !seen.insert(id) {
                    continue;
                }
            }
            out.push(wrapper);
        }
        out
    }

    // ==================== Hierarchy ====================

    /// Parent wrapper, for hierarchical nodes that have one.
    pub fn parent(&self) -> Option<Arc<SceneNode>> {
        let path = self.current_path()?;
        let parent = self.scene.parent_of(&path)?;
        Some(Self::attach(self.scene.clone(), &self.registry, &parent))
    }

    /// Direct children, in order.
    pub fn children(&self) -> Vec<Arc<SceneNode>> {
        let Some(path) = self.current_path() else {
            return Vec::new();
        };
        self.scene
            .children_of(&path)
            .into_iter()
            .map(|child| Self::attach(self.scene.clone(), &self.registry, &child))
            .collect()
    }

    /// All descendants, depth-first.
    pub fn descendants(&self) -> Vec<Arc<SceneNode>> {
        let Some(path) = self.current_path() else {
            return Vec::new();
        };
        self.scene
            .descendants_of(&path)
            .into_iter()
            .map(|child| Self::attach(self.scene.clone(), &self.registry, &child))
            .collect()
    }

    /// Move the node under `parent` (`None` = scene root). Failure is
    /// reported, not raised.
    pub fn set_parent(&self, parent: Option<&SceneNode>) -> &Self {
        let Some(path) = self.current_path() else {
            warn!(node = %self.requested, "invalid object");
            return self;
        };
        let parent_path = match parent {
            Some(p) => match p.current_path() {
                Some(pp) => Some(pp),
                None => {
                    warn!(node = %path, "invalid parent");
                    return self;
                }
            },
            None => None,
        };
        match self.scene.reparent(&path, parent_path.as_deref()) {
            Ok(new_path) => {
                *self.handle.lock() = self.scene.resolve(&new_path);
            }
            Err(err) => warn!(node = %path, %err, "reparent failed"),
        }
        self
    }

    /// Move the node to the scene root.
    pub fn parent_to_world(&self) -> &Self {
        self.set_parent(None)
    }

    /// Move every child up to this node's own parent.
    pub fn ungroup(&self) {
        let parent = self.parent();
        for child in self.children() {
            child.set_parent(parent.as_deref());
        }
    }
}

impl PartialEq for SceneNode {
    /// Wrappers compare by persistent id; unresolved wrappers only equal
    /// themselves.
    fn eq(&self, other: &Self) -> bool {
        match (self.uuid, other.uuid) {
            (Some(a), Some(b)) => a == b,
            _ => std::ptr::eq(self, other),
        }
    }
}

impl Eq for SceneNode {}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneNode")
            .field("uuid", &self.uuid)
            .field("requested", &self.requested)
            .finish()
    }
}

impl fmt::Display for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current_path() {
            Some(path) => write!(f, "{}", path),
            None => write!(f, "<invalid {}>", self.requested),
        }
    }
}
