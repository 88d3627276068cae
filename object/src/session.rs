//! Session façade: wrapper construction over one scene service.
//!
//! A session pairs a scene service with the registry its wrappers share.
//! Production code typically uses the process-wide registry; tests inject a
//! fresh one so scenes stay hermetic.

use crate::node::SceneNode;
use crate::ops;
use crate::registry::NodeRegistry;
use scenekit_core::{SceneError, SceneResult, SceneService, SceneUuid};
use std::collections::HashMap;
use std::sync::Arc;

/// Entry points for constructing wrappers, by name, by persistent id, or by
/// creation request.
pub struct SceneSession {
    scene: Arc<dyn SceneService>,
    registry: NodeRegistry,
}

impl SceneSession {
    /// Session over the process-wide registry.
    pub fn new(scene: Arc<dyn SceneService>) -> Self {
        Self {
            scene,
            registry: NodeRegistry::global().clone(),
        }
    }

    /// Session over an injected registry.
    pub fn with_registry(scene: Arc<dyn SceneService>, registry: NodeRegistry) -> Self {
        Self { scene, registry }
    }

    pub fn scene(&self) -> &Arc<dyn SceneService> {
        &self.scene
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Wrap an existing node by name or full path. Unlike [`SceneNode::open`],
    /// a name that does not resolve is an error here.
    pub fn get(&self, name: &str) -> SceneResult<Arc<SceneNode>> {
        if !self.scene.node_exists(name) {
            return Err(SceneError::NodeNotFound(name.to_string()));
        }
        SceneNode::open(self.scene.clone(), &self.registry, name)
    }

    /// Wrap the node carrying `uuid`, if it still resolves.
    pub fn by_uuid(&self, uuid: SceneUuid) -> Option<Arc<SceneNode>> {
        SceneNode::by_uuid(self.scene.clone(), &self.registry, uuid)
    }

    /// Create a node of `node_type` and wrap it.
    pub fn create(&self, node_type: &str, name: Option<&str>) -> SceneResult<Arc<SceneNode>> {
        SceneNode::create(self.scene.clone(), &self.registry, node_type, name)
    }

    /// Wrappers for every node in the scene.
    pub fn nodes(&self) -> Vec<Arc<SceneNode>> {
        self.scene
            .all_nodes()
            .into_iter()
            .map(|path| SceneNode::attach(self.scene.clone(), &self.registry, &path))
            .collect()
    }

    /// Peer-protected single delete.
    pub fn delete(&self, node: &Arc<SceneNode>) {
        ops::delete_node(node);
    }

    /// Force-unlocking atomic batch delete.
    pub fn delete_many(&self, nodes: &[Arc<SceneNode>]) {
        ops::delete_many(nodes);
    }

    // ==================== Registry Maintenance ====================

    pub fn evict(&self, uuid: SceneUuid) {
        self.registry.evict(uuid);
    }

    pub fn clear_cache(&self) {
        self.registry.clear();
    }

    pub fn cache_snapshot(&self) -> HashMap<SceneUuid, Arc<SceneNode>> {
        self.registry.snapshot()
    }
}
