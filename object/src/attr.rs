//! Chainable attribute paths.
//!
//! An [`AttrPath`] names a dotted/indexed path relative to a wrapper, like
//! `tx`, `target[1]`, or `pivot.pivotX`. Construction and navigation are
//! pure: nothing is validated and nothing is cached until an operation
//! actually touches the scene service. Many instances may denote the same
//! logical attribute; equality is by owning entity plus path string.
//!
//! Mutations follow the reported-not-raised policy: a failed `set`,
//! `connect_to`, or `delete` logs a warning and leaves the receiver
//! chainable, and any lock state the operation had to lift is restored on
//! every exit path.

use crate::get::{self, AttrValue};
use crate::node::SceneNode;
use scenekit_core::{AttrKind, Direction, PlugRef, SceneService, Value};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Lazily-validated path to an attribute or sub-attribute.
#[derive(Clone)]
pub struct AttrPath {
    node: Arc<SceneNode>,
    attr: String,
}

impl AttrPath {
    pub(crate) fn new(node: Arc<SceneNode>, attr: impl Into<String>) -> Self {
        Self {
            node,
            attr: attr.into(),
        }
    }

    /// The owning wrapper.
    pub fn node(&self) -> &Arc<SceneNode> {
        &self.node
    }

    /// The attribute path relative to the node.
    pub fn attr_path(&self) -> &str {
        &self.attr
    }

    /// Final path component, without any element index.
    pub fn name(&self) -> &str {
        let last = self.attr.rsplit('.').next().unwrap_or(&self.attr);
        last.split('[').next().unwrap_or(last)
    }

    /// Navigate to a named sub-attribute. Pure; no scene call.
    pub fn child(&self, name: &str) -> AttrPath {
        AttrPath::new(self.node.clone(), format!("{}.{}", self.attr, name))
    }

    /// Navigate to an array element. Pure; no scene call.
    pub fn index(&self, i: usize) -> AttrPath {
        AttrPath::new(self.node.clone(), format!("{}[{}]", self.attr, i))
    }

    /// Fully-qualified path, when the owning node resolves.
    pub fn full_path(&self) -> Option<String> {
        self.node
            .current_path()
            .map(|p| format!("{}.{}", p, self.attr))
    }

    /// Whether the attribute currently resolves. Never warns.
    pub fn exists(&self) -> bool {
        match self.node.current_path() {
            Some(path) => self.scene().attr_exists(&path, &self.attr),
            None => false,
        }
    }

    /// Value-kind classification, when the attribute resolves.
    pub fn kind(&self) -> Option<AttrKind> {
        let path = self.node.current_path()?;
        self.scene().attr_kind(&path, &self.attr)
    }

    /// Whether the slot has array cardinality.
    pub fn is_multi(&self) -> bool {
        match self.node.current_path() {
            Some(path) => self.scene().attr_is_multi(&path, &self.attr),
            None => false,
        }
    }

    // ==================== Values ====================

    /// Classification-driven read. Missing attributes resolve to
    /// [`AttrValue::Absent`] with a warning, never an error.
    pub fn get(&self) -> AttrValue {
        let Some(node_path) = self.checked() else {
            return AttrValue::Absent;
        };
        get::resolve(&self.node, &node_path, &self.attr)
    }

    /// Write a literal value.
    ///
    /// If the slot is locked it is unlocked for the write and the original
    /// lock state is restored whatever the outcome. Failure (kind mismatch,
    /// missing slot) is reported, not raised.
    pub fn set(&self, value: impl Into<Value>) -> &Self {
        let Some(node_path) = self.checked() else {
            return self;
        };
        let scene = self.scene();
        let was_locked = scene.attr_locked(&node_path, &self.attr);
        if was_locked {
            let _ = scene.lock_attr(&node_path, &self.attr, false);
        }
        let result = scene.set_scalar(&node_path, &self.attr, value.into());
        if was_locked {
            let _ = scene.lock_attr(&node_path, &self.attr, true);
        }
        if let Err(err) = result {
            warn!(attr = %self.qualified(&node_path), %err, "set failed");
        }
        self
    }

    // ==================== Locks ====================

    pub fn lock(&self, state: bool) -> &Self {
        let Some(node_path) = self.checked() else {
            return self;
        };
        if let Err(err) = self.scene().lock_attr(&node_path, &self.attr, state) {
            warn!(attr = %self.qualified(&node_path), %err, "lock failed");
        }
        self
    }

    pub fn is_locked(&self) -> bool {
        match self.node.current_path() {
            Some(path) => self.scene().attr_locked(&path, &self.attr),
            None => false,
        }
    }

    // ==================== Connections ====================

    /// Connect this plug into `dst`. Idempotent: an existing edge is left
    /// alone. Incompatible endpoints are reported, not raised.
    pub fn connect_to(&self, dst: &AttrPath) -> &Self {
        let Some(from_node) = self.checked() else {
            return self;
        };
        let Some(to_node) = dst.checked() else {
            return self;
        };
        let from = PlugRef::new(from_node, self.attr.clone());
        let to = PlugRef::new(to_node, dst.attr.clone());
        if self.scene().connected(&from, &to) {
            return self;
        }
        if let Err(err) = self.scene().connect(&from, &to) {
            warn!(from = %from, to = %to, %err, "connection failed");
        }
        self
    }

    /// Connect `src` into this plug.
    pub fn connect_from(&self, src: &AttrPath) -> &Self {
        src.connect_to(self);
        self
    }

    /// Remove edges touching this plug in the requested direction; no-op
    /// when none exist.
    pub fn disconnect(&self, direction: Direction) -> &Self {
        let Some(node_path) = self.checked() else {
            return self;
        };
        for conn in self.scene().connections(&node_path, &self.attr, direction) {
            if let Err(err) = self.scene().disconnect(&conn.from, &conn.to) {
                warn!(from = %conn.from, to = %conn.to, %err, "disconnect failed");
            }
        }
        self
    }

    // ==================== Structure ====================

    /// Delete the attribute: unlock, then remove. Failure (built-in,
    /// non-removable slot) is reported and the prior lock state restored.
    pub fn delete(&self) {
        let Some(node_path) = self.checked() else {
            return;
        };
        let scene = self.scene();
        let was_locked = scene.attr_locked(&node_path, &self.attr);
        if was_locked {
            let _ = scene.lock_attr(&node_path, &self.attr, false);
        }
        if let Err(err) = scene.delete_attr(&node_path, &self.attr) {
            if was_locked {
                let _ = scene.lock_attr(&node_path, &self.attr, true);
            }
            warn!(attr = %self.qualified(&node_path), %err, "unable to delete attribute");
        }
    }

    /// Rename the attribute, preserving lock state.
    ///
    /// Returns a path bound to the new name on success, or the original path
    /// (lock state restored) on failure.
    pub fn rename(&self, new_name: &str) -> AttrPath {
        let Some(node_path) = self.checked() else {
            return self.clone();
        };
        let scene = self.scene();
        let was_locked = scene.attr_locked(&node_path, &self.attr);
        if was_locked {
            let _ = scene.lock_attr(&node_path, &self.attr, false);
        }
        match scene.rename_attr(&node_path, &self.attr, new_name) {
            Ok(()) => {
                if was_locked {
                    let _ = scene.lock_attr(&node_path, new_name, true);
                }
                AttrPath::new(self.node.clone(), new_name)
            }
            Err(err) => {
                if was_locked {
                    let _ = scene.lock_attr(&node_path, &self.attr, true);
                }
                warn!(attr = %self.qualified(&node_path), %err, "rename failed");
                self.clone()
            }
        }
    }

    /// Enclosing compound path, for sub-attribute paths.
    pub fn parent(&self) -> Option<AttrPath> {
        let idx = self.attr.rfind('.')?;
        Some(AttrPath::new(self.node.clone(), &self.attr[..idx]))
    }

    /// Sub-attribute paths of a compound slot, in declared order.
    pub fn children(&self) -> Vec<AttrPath> {
        let Some(node_path) = self.checked() else {
            return Vec::new();
        };
        self.scene()
            .sub_attrs(&node_path, &self.attr)
            .into_iter()
            .map(|name| self.child(&name))
            .collect()
    }

    // ==================== Internal ====================

    fn scene(&self) -> &Arc<dyn SceneService> {
        self.node.scene()
    }

    fn qualified(&self, node_path: &str) -> String {
        format!("{}.{}", node_path, self.attr)
    }

    /// Node path when both the node and the attribute resolve; warns
    /// otherwise.
    fn checked(&self) -> Option<String> {
        let Some(path) = self.node.current_path() else {
            warn!(attr = %self, "invalid object");
            return None;
        };
        if !self.scene().attr_exists(&path, &self.attr) {
            warn!(attr = %self.qualified(&path), "invalid attribute");
            return None;
        }
        Some(path)
    }
}

impl PartialEq for AttrPath {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.attr == other.attr
    }
}

impl Eq for AttrPath {}

impl fmt::Debug for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrPath")
            .field("node", &self.node)
            .field("attr", &self.attr)
            .finish()
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node.current_path() {
            Some(path) => write!(f, "{}.{}", path, self.attr),
            None => write!(f, "<invalid>.{}", self.attr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeRegistry;
    use scenekit_scene::MemoryScene;

    fn node(name: &str, node_type: &str) -> Arc<SceneNode> {
        let scene: Arc<dyn SceneService> = Arc::new(MemoryScene::with_standard_schema());
        let registry = NodeRegistry::new();
        SceneNode::create(scene, &registry, node_type, Some(name)).unwrap()
    }

    // ========== TEST: navigation_is_pure ==========
    #[test]
    fn test_navigation_is_pure() {
        let n = node("n", "group");
        // Nonsense paths navigate fine; nothing validates until use.
        let bogus = n.attr("noSuchThing").child("deeper").index(4);
        assert_eq!(bogus.attr_path(), "noSuchThing.deeper[4]");
        assert_eq!(bogus.name(), "deeper");
        assert!(!bogus.exists());
    }

    // ========== TEST: set_get_roundtrip ==========
    #[test]
    fn test_set_get_roundtrip() {
        let n = node("n", "group");
        n.attr("tx").set(5.0);
        assert_eq!(n.attr("tx").get().as_float(), Some(5.0));
    }

    // ========== TEST: set_on_locked_attr_preserves_lock ==========
    #[test]
    fn test_set_on_locked_attr_preserves_lock() {
        let n = node("n", "group");
        let tx = n.attr("tx");
        tx.lock(true);

        tx.set(5.0);
        assert!(tx.is_locked());
        assert_eq!(tx.get().as_float(), Some(5.0));

        // Failure path restores the lock too.
        tx.set("not a number");
        assert!(tx.is_locked());
        assert_eq!(tx.get().as_float(), Some(5.0));
    }

    // ========== TEST: chaining_survives_failure ==========
    #[test]
    fn test_chaining_survives_failure() {
        let n = node("n", "group");
        // Setting a missing attribute warns and chains.
        n.attr("ghost").set(1.0).set(2.0).lock(true);
        assert!(!n.attr("ghost").exists());
    }

    // ========== TEST: rename_preserves_lock_state ==========
    #[test]
    fn test_rename_preserves_lock_state() {
        let n = node("n", "network");
        let spec = scenekit_core::AttrSpec::float("custom");
        let attr = n.add_attr(spec).unwrap();
        attr.lock(true);

        let renamed = attr.rename("better");
        assert_eq!(renamed.attr_path(), "better");
        assert!(renamed.is_locked());
        assert!(!attr.exists());

        // Renaming a built-in fails; original path comes back, still locked.
        let label = n.attr("label");
        label.lock(true);
        let same = label.rename("nope");
        assert_eq!(same.attr_path(), "label");
        assert!(same.is_locked());
    }

    // ========== TEST: delete_builtin_reported_and_lock_restored ==========
    #[test]
    fn test_delete_builtin_reported_and_lock_restored() {
        let n = node("n", "group");
        let tx = n.attr("tx");
        tx.lock(true);
        tx.delete();
        assert!(tx.exists());
        assert!(tx.is_locked());

        // Dynamic attributes do delete.
        let attr = n.add_attr(scenekit_core::AttrSpec::float("custom")).unwrap();
        attr.delete();
        assert!(!attr.exists());
    }

    // ========== TEST: compound_navigation ==========
    #[test]
    fn test_compound_navigation() {
        let n = node("n", "group");
        let pivot = n.attr("pivot");
        let names: Vec<String> = pivot
            .children()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, ["pivotX", "pivotY", "pivotZ"]);
        assert_eq!(
            pivot.child("pivotX").parent().unwrap().attr_path(),
            "pivot"
        );
        assert_eq!(pivot.parent(), None);
    }
}
