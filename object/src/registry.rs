//! Identity registry: at most one live wrapper per persistent id.

use crate::node::SceneNode;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use scenekit_core::SceneUuid;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::debug;

static GLOBAL: Lazy<NodeRegistry> = Lazy::new(NodeRegistry::new);

/// Process-wide cache mapping a persistent id to at most one live wrapper.
///
/// The registry holds weak references only: it observes wrappers, it never
/// keeps them alive. Once every strong reference to a wrapper is dropped, the
/// entry is dead and a later lookup constructs a fresh wrapper synchronized
/// to the entity's then-current state. Dead entries are pruned on access.
///
/// The mutex serializes map lookups and inserts only; it is never held
/// across a call into the scene service, and no registry operation re-enters
/// the registry.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    inner: Arc<Mutex<HashMap<SceneUuid, Weak<SceneNode>>>>,
}

impl NodeRegistry {
    /// Create an empty registry. Tests inject fresh instances; production
    /// code normally shares [`NodeRegistry::global`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared process-wide registry, initialized on first use.
    pub fn global() -> &'static NodeRegistry {
        &GLOBAL
    }

    /// Return the live wrapper for `uuid`, or register `candidate` and
    /// return it.
    pub fn register_or_get(&self, uuid: SceneUuid, candidate: Arc<SceneNode>) -> Arc<SceneNode> {
        let mut map = self.inner.lock();
        if let Some(existing) = map.get(&uuid).and_then(Weak::upgrade) {
            return existing;
        }
        debug!(%uuid, "registering wrapper");
        map.insert(uuid, Arc::downgrade(&candidate));
        candidate
    }

    /// The live wrapper for `uuid`, if any. A dead entry is pruned.
    pub fn get(&self, uuid: SceneUuid) -> Option<Arc<SceneNode>> {
        let mut map = self.inner.lock();
        match map.get(&uuid).map(Weak::upgrade) {
            Some(Some(node)) => Some(node),
            Some(None) => {
                map.remove(&uuid);
                None
            }
            None => None,
        }
    }

    /// Drop the entry for `uuid`, live or not.
    pub fn evict(&self, uuid: SceneUuid) {
        self.inner.lock().remove(&uuid);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// The live entries. Dead entries are pruned as a side effect.
    pub fn snapshot(&self) -> HashMap<SceneUuid, Arc<SceneNode>> {
        let mut map = self.inner.lock();
        let mut live = HashMap::new();
        map.retain(|uuid, weak| match weak.upgrade() {
            Some(node) => {
                live.insert(*uuid, node);
                true
            }
            None => false,
        });
        live
    }

    /// Number of entries, live or not.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
