//! `SceneService` implementation over the in-memory graph.
//!
//! The trait surface is interior-mutable; the engine underneath is a plain
//! `&mut self` store. One RwLock bridges the two, taken per call and never
//! held across anything that could call back in.

use crate::graph::SceneGraph;
use crate::path::AttrAddr;
use crate::schema::Schema;
use parking_lot::RwLock;
use scenekit_core::{
    AttrKind, AttrSpec, Connection, Direction, NativeHandle, PlugRef, ResolvedHandle, SceneError,
    SceneResult, SceneService, SceneUuid, Value,
};
use tracing::debug;

/// In-memory reference scene.
pub struct MemoryScene {
    graph: RwLock<SceneGraph>,
}

impl MemoryScene {
    pub fn new(schema: Schema) -> Self {
        Self {
            graph: RwLock::new(SceneGraph::new(schema)),
        }
    }

    /// Scene over [`Schema::standard`].
    pub fn with_standard_schema() -> Self {
        Self::new(Schema::standard())
    }

    fn parse_attr(attr: &str) -> SceneResult<AttrAddr> {
        AttrAddr::parse(attr).ok_or_else(|| SceneError::InvalidName(attr.to_string()))
    }

    fn find(graph: &SceneGraph, path: &str) -> SceneResult<usize> {
        graph
            .find(path)
            .ok_or_else(|| SceneError::NodeNotFound(path.to_string()))
    }

    fn find_plug(graph: &SceneGraph, plug: &PlugRef) -> SceneResult<(usize, AttrAddr)> {
        let slot = Self::find(graph, &plug.node_path)?;
        let addr = Self::parse_attr(&plug.attr_path)?;
        if !graph.attr_exists(slot, &addr) {
            return Err(SceneError::AttrNotFound {
                node: plug.node_path.clone(),
                attr: plug.attr_path.clone(),
            });
        }
        Ok((slot, addr))
    }
}

impl SceneService for MemoryScene {
    // ==================== Existence & Resolution ====================

    fn node_exists(&self, path: &str) -> bool {
        self.graph.read().find(path).is_some()
    }

    fn attr_exists(&self, node: &str, attr: &str) -> bool {
        let graph = self.graph.read();
        let Some(slot) = graph.find(node) else {
            return false;
        };
        let Some(addr) = AttrAddr::parse(attr) else {
            return false;
        };
        graph.attr_exists(slot, &addr)
    }

    fn resolve(&self, path: &str) -> Option<ResolvedHandle> {
        self.graph.read().resolve(path)
    }

    fn handle_valid(&self, handle: NativeHandle) -> bool {
        self.graph.read().handle_valid(handle)
    }

    fn path_of(&self, handle: NativeHandle) -> Option<String> {
        self.graph.read().path_of_handle(handle)
    }

    fn uuid_of(&self, path: &str) -> Option<SceneUuid> {
        let graph = self.graph.read();
        graph.find(path).and_then(|slot| graph.node_uuid(slot))
    }

    fn path_from_uuid(&self, uuid: SceneUuid) -> Option<String> {
        let graph = self.graph.read();
        graph.slot_from_uuid(uuid).and_then(|slot| graph.full_path(slot))
    }

    // ==================== Nodes ====================

    fn create_node(&self, node_type: &str, requested_name: Option<&str>) -> SceneResult<String> {
        let mut graph = self.graph.write();
        let slot = graph.create_node(node_type, requested_name)?;
        let path = graph.full_path(slot).expect("fresh node has a path");
        debug!(node = %path, node_type, "created node");
        Ok(path)
    }

    fn delete_node(&self, path: &str) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let slot = Self::find(&graph, path)?;
        graph.delete_node(slot)?;
        debug!(node = %path, "deleted node");
        Ok(())
    }

    fn delete_many(&self, paths: &[String]) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let slots = paths
            .iter()
            .map(|p| Self::find(&graph, p))
            .collect::<SceneResult<Vec<_>>>()?;
        graph.delete_many(&slots)
    }

    fn rename_node(&self, path: &str, new_name: &str) -> SceneResult<String> {
        let mut graph = self.graph.write();
        let slot = Self::find(&graph, path)?;
        graph.rename_node(slot, new_name)
    }

    fn node_type(&self, path: &str) -> Option<String> {
        let graph = self.graph.read();
        graph.find(path).and_then(|slot| graph.node_type(slot))
    }

    fn all_nodes(&self) -> Vec<String> {
        let graph = self.graph.read();
        graph
            .live_slots()
            .into_iter()
            .filter_map(|slot| graph.full_path(slot))
            .collect()
    }

    // ==================== Hierarchy ====================

    fn parent_of(&self, path: &str) -> Option<String> {
        let graph = self.graph.read();
        let slot = graph.find(path)?;
        graph.parent(slot).and_then(|p| graph.full_path(p))
    }

    fn children_of(&self, path: &str) -> Vec<String> {
        let graph = self.graph.read();
        let Some(slot) = graph.find(path) else {
            return Vec::new();
        };
        graph
            .children(slot)
            .into_iter()
            .filter_map(|c| graph.full_path(c))
            .collect()
    }

    fn descendants_of(&self, path: &str) -> Vec<String> {
        let graph = self.graph.read();
        let Some(slot) = graph.find(path) else {
            return Vec::new();
        };
        graph
            .descendants(slot)
            .into_iter()
            .filter_map(|c| graph.full_path(c))
            .collect()
    }

    fn reparent(&self, path: &str, new_parent: Option<&str>) -> SceneResult<String> {
        let mut graph = self.graph.write();
        let slot = Self::find(&graph, path)?;
        let parent_slot = match new_parent {
            Some(p) => Some(Self::find(&graph, p)?),
            None => None,
        };
        graph.reparent(slot, parent_slot)
    }

    // ==================== Locks ====================

    fn lock_node(&self, path: &str, locked: bool) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let slot = Self::find(&graph, path)?;
        graph.lock_node(slot, locked)
    }

    fn node_locked(&self, path: &str) -> bool {
        let graph = self.graph.read();
        graph.find(path).map(|s| graph.node_locked(s)).unwrap_or(false)
    }

    fn lock_attr(&self, node: &str, attr: &str, locked: bool) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let slot = Self::find(&graph, node)?;
        graph.lock_attr(slot, &Self::parse_attr(attr)?, locked)
    }

    fn attr_locked(&self, node: &str, attr: &str) -> bool {
        let graph = self.graph.read();
        let Some(slot) = graph.find(node) else {
            return false;
        };
        let Some(addr) = AttrAddr::parse(attr) else {
            return false;
        };
        graph.attr_locked(slot, &addr)
    }

    // ==================== Attributes ====================

    fn attr_kind(&self, node: &str, attr: &str) -> Option<AttrKind> {
        let graph = self.graph.read();
        let slot = graph.find(node)?;
        graph.attr_kind(slot, &AttrAddr::parse(attr)?)
    }

    fn attr_is_multi(&self, node: &str, attr: &str) -> bool {
        let graph = self.graph.read();
        let Some(slot) = graph.find(node) else {
            return false;
        };
        let Some(addr) = AttrAddr::parse(attr) else {
            return false;
        };
        graph.attr_is_multi(slot, &addr)
    }

    fn attr_cardinality(&self, node: &str, attr: &str) -> usize {
        // Write lock: the probe may materialize index 0.
        let mut graph = self.graph.write();
        let Some(slot) = graph.find(node) else {
            return 0;
        };
        let Some(addr) = AttrAddr::parse(attr) else {
            return 0;
        };
        graph.attr_cardinality(slot, &addr)
    }

    fn attr_indices(&self, node: &str, attr: &str) -> Vec<usize> {
        let graph = self.graph.read();
        let Some(slot) = graph.find(node) else {
            return Vec::new();
        };
        let Some(addr) = AttrAddr::parse(attr) else {
            return Vec::new();
        };
        graph.attr_indices(slot, &addr)
    }

    fn list_attrs(&self, node: &str) -> Vec<String> {
        let graph = self.graph.read();
        graph.find(node).map(|s| graph.list_attrs(s)).unwrap_or_default()
    }

    fn sub_attrs(&self, node: &str, attr: &str) -> Vec<String> {
        let graph = self.graph.read();
        let Some(slot) = graph.find(node) else {
            return Vec::new();
        };
        let Some(addr) = AttrAddr::parse(attr) else {
            return Vec::new();
        };
        graph.sub_attrs(slot, &addr)
    }

    fn add_attr(&self, node: &str, spec: AttrSpec) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let slot = Self::find(&graph, node)?;
        graph.add_attr(slot, spec)
    }

    fn delete_attr(&self, node: &str, attr: &str) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let slot = Self::find(&graph, node)?;
        graph.delete_attr(slot, &Self::parse_attr(attr)?)
    }

    fn rename_attr(&self, node: &str, attr: &str, new_name: &str) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let slot = Self::find(&graph, node)?;
        graph.rename_attr(slot, &Self::parse_attr(attr)?, new_name)
    }

    // ==================== Values ====================

    fn get_scalar(&self, node: &str, attr: &str) -> SceneResult<Value> {
        let graph = self.graph.read();
        let slot = Self::find(&graph, node)?;
        graph.get_scalar(slot, &Self::parse_attr(attr)?)
    }

    fn set_scalar(&self, node: &str, attr: &str, value: Value) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let slot = Self::find(&graph, node)?;
        graph.set_scalar(slot, &Self::parse_attr(attr)?, value)
    }

    // ==================== Connections ====================

    fn connections(&self, node: &str, attr: &str, direction: Direction) -> Vec<Connection> {
        let graph = self.graph.read();
        let Some(slot) = graph.find(node) else {
            return Vec::new();
        };
        let Some(addr) = AttrAddr::parse(attr) else {
            return Vec::new();
        };
        graph.attr_connections(slot, &addr, direction)
    }

    fn node_connections(&self, node: &str, direction: Direction) -> Vec<Connection> {
        let graph = self.graph.read();
        let Some(slot) = graph.find(node) else {
            return Vec::new();
        };
        graph.node_connections(slot, direction)
    }

    fn connected(&self, from: &PlugRef, to: &PlugRef) -> bool {
        let graph = self.graph.read();
        let Ok((from_slot, from_addr)) = Self::find_plug(&graph, from) else {
            return false;
        };
        let Ok((to_slot, to_addr)) = Self::find_plug(&graph, to) else {
            return false;
        };
        graph.connected(from_slot, &from_addr, to_slot, &to_addr)
    }

    fn connect(&self, from: &PlugRef, to: &PlugRef) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let (from_slot, from_addr) = Self::find_plug(&graph, from)?;
        let (to_slot, to_addr) = Self::find_plug(&graph, to)?;
        graph.connect(from_slot, &from_addr, to_slot, &to_addr)
    }

    fn disconnect(&self, from: &PlugRef, to: &PlugRef) -> SceneResult<()> {
        let mut graph = self.graph.write();
        let (from_slot, from_addr) = Self::find_plug(&graph, from)?;
        let (to_slot, to_addr) = Self::find_plug(&graph, to)?;
        graph.disconnect(from_slot, &from_addr, to_slot, &to_addr)
    }
}
