//! In-memory scene graph storage.
//!
//! Slot-allocated node store with generation-checked handles. Slots are never
//! reused; a deleted slot stays `None` so any outstanding handle to it fails
//! validation. Rename and reparent bump the slot generation, which is how the
//! reference scene models hosts that invalidate native handles on namespace
//! churn.

use crate::path::{is_valid_name, AttrAddr};
use crate::schema::Schema;
use scenekit_core::{
    AttrKind, AttrSpec, Connection, Direction, NativeHandle, PlugRef, ResolvedHandle, ScalarKind,
    SceneError, SceneResult, SceneUuid, Value,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Stored state of one attribute slot.
#[derive(Debug, Clone)]
struct AttrState {
    spec: AttrSpec,
    locked: bool,
    /// Payload of plain scalar/string slots.
    single: Option<Value>,
    /// Populated elements of array-capable slots, in index order.
    elements: BTreeMap<usize, Value>,
    /// Compound children, in declared order.
    children: Vec<AttrState>,
}

impl AttrState {
    fn from_spec(spec: AttrSpec) -> Self {
        let children = spec
            .children
            .iter()
            .cloned()
            .map(AttrState::from_spec)
            .collect();
        let single = if spec.multi {
            None
        } else {
            default_value(&spec)
        };
        Self {
            spec,
            locked: false,
            single,
            elements: BTreeMap::new(),
            children,
        }
    }
}

fn default_value(spec: &AttrSpec) -> Option<Value> {
    if let Some(v) = &spec.default {
        return Some(v.clone());
    }
    match spec.kind {
        AttrKind::Scalar(ScalarKind::Bool) => Some(Value::Bool(false)),
        AttrKind::Scalar(ScalarKind::Float) => Some(Value::Float(0.0)),
        AttrKind::Scalar(ScalarKind::Int) | AttrKind::Scalar(ScalarKind::Enum) => {
            Some(Value::Int(0))
        }
        AttrKind::Text => Some(Value::String(String::new())),
        AttrKind::Reference | AttrKind::Compound => None,
    }
}

fn kind_name(kind: AttrKind) -> &'static str {
    match kind {
        AttrKind::Reference => "Reference",
        AttrKind::Text => "Text",
        AttrKind::Compound => "Compound",
        AttrKind::Scalar(ScalarKind::Bool) => "Bool",
        AttrKind::Scalar(ScalarKind::Int) => "Int",
        AttrKind::Scalar(ScalarKind::Float) => "Float",
        AttrKind::Scalar(ScalarKind::Enum) => "Enum",
    }
}

/// One node record.
#[derive(Debug, Clone)]
struct NodeRecord {
    name: String,
    type_name: String,
    hierarchical: bool,
    auxiliary: bool,
    uuid: SceneUuid,
    generation: u64,
    parent: Option<usize>,
    children: Vec<usize>,
    locked: bool,
    attrs: Vec<AttrState>,
}

/// Internal connection endpoint: slot plus canonical attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Plug {
    slot: usize,
    attr: String,
}

#[derive(Debug, Clone)]
struct ConnRec {
    from: Plug,
    to: Plug,
}

/// The in-memory scene graph.
#[derive(Debug)]
pub struct SceneGraph {
    schema: Schema,
    slots: Vec<Option<NodeRecord>>,
    uuid_index: HashMap<SceneUuid, usize>,
    /// Directed edges in creation order.
    connections: Vec<ConnRec>,
}

impl SceneGraph {
    /// Create an empty graph over the given schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            slots: Vec::new(),
            uuid_index: HashMap::new(),
            connections: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    // ==================== Node Operations ====================

    /// Create a node of `node_type`. A requested name is uniquified when
    /// already taken; with no request the type name plus a counter is used.
    pub fn create_node(&mut self, node_type: &str, requested: Option<&str>) -> SceneResult<usize> {
        let def = self
            .schema
            .get(node_type)
            .ok_or_else(|| SceneError::UnknownNodeType(node_type.to_string()))?
            .clone();
        if let Some(name) = requested {
            if !is_valid_name(name) {
                return Err(SceneError::InvalidName(name.to_string()));
            }
        }
        let name = match requested {
            Some(name) if !self.name_taken(name) => name.to_string(),
            Some(name) => self.counted_name(name),
            None => self.counted_name(&def.name),
        };

        let slot = self.slots.len();
        let uuid = SceneUuid::generate();
        let attrs = def.attrs.iter().cloned().map(AttrState::from_spec).collect();
        self.slots.push(Some(NodeRecord {
            name,
            type_name: def.name.clone(),
            hierarchical: def.hierarchical,
            auxiliary: def.auxiliary,
            uuid,
            generation: 0,
            parent: None,
            children: Vec::new(),
            locked: false,
            attrs,
        }));
        self.uuid_index.insert(uuid, slot);
        Ok(slot)
    }

    /// Delete a node (cascading over its subtree) together with any unlocked
    /// auxiliary helpers connected to the doomed set.
    pub fn delete_node(&mut self, slot: usize) -> SceneResult<()> {
        let rec = self.record(slot)?;
        if rec.locked {
            return Err(SceneError::Locked(self.display_path(slot)));
        }
        let seeds: HashSet<usize> = self.subtree(slot).into_iter().collect();
        self.cascade_and_remove(seeds);
        Ok(())
    }

    /// Atomically delete several nodes: every slot is validated before
    /// anything is removed.
    pub fn delete_many(&mut self, slots: &[usize]) -> SceneResult<()> {
        for &slot in slots {
            let rec = self.record(slot)?;
            if rec.locked {
                return Err(SceneError::Locked(self.display_path(slot)));
            }
        }
        let mut seeds = HashSet::new();
        for &slot in slots {
            seeds.extend(self.subtree(slot));
        }
        self.cascade_and_remove(seeds);
        Ok(())
    }

    /// Rename a node; the new name is uniquified when taken. Outstanding
    /// handles to the node are invalidated.
    pub fn rename_node(&mut self, slot: usize, new_name: &str) -> SceneResult<String> {
        if !is_valid_name(new_name) {
            return Err(SceneError::InvalidName(new_name.to_string()));
        }
        let rec = self.record(slot)?;
        if rec.locked {
            return Err(SceneError::Locked(self.display_path(slot)));
        }
        let name = if rec.name == new_name || !self.name_taken(new_name) {
            new_name.to_string()
        } else {
            self.counted_name(new_name)
        };
        let rec = self.record_mut(slot)?;
        rec.name = name;
        rec.generation += 1;
        Ok(self.display_path(slot))
    }

    /// Move a hierarchical node under a new parent (`None` = scene root).
    /// Outstanding handles to the node are invalidated.
    pub fn reparent(&mut self, slot: usize, new_parent: Option<usize>) -> SceneResult<String> {
        let rec = self.record(slot)?;
        if !rec.hierarchical {
            return Err(SceneError::InvalidOperation(format!(
                "{} is not hierarchical",
                self.display_path(slot)
            )));
        }
        if rec.locked {
            return Err(SceneError::Locked(self.display_path(slot)));
        }
        let old_parent = rec.parent;
        if let Some(parent) = new_parent {
            let prec = self.record(parent)?;
            if !prec.hierarchical {
                return Err(SceneError::InvalidOperation(format!(
                    "{} cannot have children",
                    self.display_path(parent)
                )));
            }
            if self.subtree(slot).contains(&parent) {
                return Err(SceneError::InvalidOperation(
                    "cannot reparent a node under its own descendant".into(),
                ));
            }
        }
        if let Some(old) = old_parent {
            if let Ok(orec) = self.record_mut(old) {
                orec.children.retain(|&c| c != slot);
            }
        }
        if let Some(parent) = new_parent {
            self.record_mut(parent)?.children.push(slot);
        }
        let rec = self.record_mut(slot)?;
        rec.parent = new_parent;
        rec.generation += 1;
        Ok(self.display_path(slot))
    }

    pub fn lock_node(&mut self, slot: usize, locked: bool) -> SceneResult<()> {
        self.record_mut(slot)?.locked = locked;
        Ok(())
    }

    pub fn node_locked(&self, slot: usize) -> bool {
        self.record(slot).map(|r| r.locked).unwrap_or(false)
    }

    pub fn node_type(&self, slot: usize) -> Option<String> {
        self.record(slot).ok().map(|r| r.type_name.clone())
    }

    pub fn node_uuid(&self, slot: usize) -> Option<SceneUuid> {
        self.record(slot).ok().map(|r| r.uuid)
    }

    pub fn slot_from_uuid(&self, uuid: SceneUuid) -> Option<usize> {
        self.uuid_index.get(&uuid).copied()
    }

    /// Slots of all live nodes, in creation order.
    pub fn live_slots(&self) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&s| self.slots[s].is_some())
            .collect()
    }

    // ==================== Resolution ====================

    /// Find a node by `|`-separated full path, or by bare leaf name when the
    /// name is unambiguous.
    pub fn find(&self, path: &str) -> Option<usize> {
        if let Some(stripped) = path.strip_prefix('|') {
            let mut current: Option<usize> = None;
            for seg in stripped.split('|') {
                let next = match current {
                    None => self.roots().into_iter().find(|&s| self.leaf_name(s) == seg),
                    Some(slot) => self
                        .record(slot)
                        .ok()?
                        .children
                        .iter()
                        .copied()
                        .find(|&s| self.leaf_name(s) == seg),
                };
                current = Some(next?);
            }
            current
        } else {
            let mut hit = None;
            for slot in self.live_slots() {
                if self.leaf_name(slot) == path {
                    if hit.is_some() {
                        // Ambiguous short name.
                        return None;
                    }
                    hit = Some(slot);
                }
            }
            hit
        }
    }

    /// Current handle for a slot.
    pub fn handle(&self, slot: usize) -> Option<NativeHandle> {
        let rec = self.record(slot).ok()?;
        Some(NativeHandle::new(slot as u64, rec.generation))
    }

    /// Resolve a path to a classified handle.
    pub fn resolve(&self, path: &str) -> Option<ResolvedHandle> {
        let slot = self.find(path)?;
        let rec = self.record(slot).ok()?;
        let handle = NativeHandle::new(slot as u64, rec.generation);
        Some(if rec.hierarchical {
            ResolvedHandle::Hierarchical(handle)
        } else {
            ResolvedHandle::Flat(handle)
        })
    }

    pub fn handle_valid(&self, handle: NativeHandle) -> bool {
        self.record(handle.slot() as usize)
            .map(|r| r.generation == handle.generation())
            .unwrap_or(false)
    }

    pub fn path_of_handle(&self, handle: NativeHandle) -> Option<String> {
        if !self.handle_valid(handle) {
            return None;
        }
        self.full_path(handle.slot() as usize)
    }

    /// Full path of a live node: `|`-joined for hierarchical nodes, the bare
    /// name for flat ones.
    pub fn full_path(&self, slot: usize) -> Option<String> {
        let rec = self.record(slot).ok()?;
        if !rec.hierarchical {
            return Some(rec.name.clone());
        }
        let mut parts = vec![rec.name.clone()];
        let mut cur = rec.parent;
        while let Some(p) = cur {
            let prec = self.record(p).ok()?;
            parts.push(prec.name.clone());
            cur = prec.parent;
        }
        parts.reverse();
        Some(format!("|{}", parts.join("|")))
    }

    // ==================== Hierarchy ====================

    pub fn parent(&self, slot: usize) -> Option<usize> {
        self.record(slot).ok()?.parent
    }

    pub fn children(&self, slot: usize) -> Vec<usize> {
        self.record(slot)
            .map(|r| r.children.clone())
            .unwrap_or_default()
    }

    /// All descendants, depth-first, excluding the node itself.
    pub fn descendants(&self, slot: usize) -> Vec<usize> {
        let mut out = self.subtree(slot);
        out.retain(|&s| s != slot);
        out
    }

    // ==================== Attributes ====================

    pub fn attr_exists(&self, slot: usize, addr: &AttrAddr) -> bool {
        match self.attr_ref(slot, addr) {
            Some((state, _)) => addr.index().is_none() || state.spec.multi,
            None => false,
        }
    }

    pub fn attr_kind(&self, slot: usize, addr: &AttrAddr) -> Option<AttrKind> {
        self.attr_ref(slot, addr).map(|(s, _)| s.spec.kind)
    }

    /// Whether the addressed slot has array cardinality. An element address
    /// (`values[2]`) behaves as a plain slot.
    pub fn attr_is_multi(&self, slot: usize, addr: &AttrAddr) -> bool {
        self.attr_ref(slot, addr)
            .map(|(s, _)| s.spec.multi && addr.index().is_none())
            .unwrap_or(false)
    }

    /// Populated-index count. Probing an untouched array-capable scalar slot
    /// materializes index 0 with its default value and still reports the
    /// pre-materialization count.
    pub fn attr_cardinality(&mut self, slot: usize, addr: &AttrAddr) -> usize {
        let Some(state) = self.attr_mut(slot, addr) else {
            return 0;
        };
        if let Some(i) = addr.index() {
            return usize::from(state.elements.contains_key(&i));
        }
        if state.spec.multi {
            let count = state.elements.len();
            if count == 0 {
                if let Some(v) = default_value(&state.spec) {
                    state.elements.insert(0, v);
                }
            }
            count
        } else {
            1
        }
    }

    /// Populated indices in ascending order.
    pub fn attr_indices(&self, slot: usize, addr: &AttrAddr) -> Vec<usize> {
        let Some((state, _)) = self.attr_ref(slot, addr) else {
            return Vec::new();
        };
        if let Some(i) = addr.index() {
            return if state.elements.contains_key(&i) {
                vec![i]
            } else {
                Vec::new()
            };
        }
        state.elements.keys().copied().collect()
    }

    pub fn list_attrs(&self, slot: usize) -> Vec<String> {
        self.record(slot)
            .map(|r| r.attrs.iter().map(|a| a.spec.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Child names of a compound slot, declared order.
    pub fn sub_attrs(&self, slot: usize, addr: &AttrAddr) -> Vec<String> {
        self.attr_ref(slot, addr)
            .map(|(s, _)| s.children.iter().map(|c| c.spec.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn add_attr(&mut self, slot: usize, spec: AttrSpec) -> SceneResult<()> {
        validate_spec_names(&spec)?;
        let path = self.display_path(slot);
        let rec = self.record_mut(slot)?;
        if rec.attrs.iter().any(|a| a.spec.name == spec.name) {
            return Err(SceneError::NameTaken(format!("{}.{}", path, spec.name)));
        }
        rec.attrs.push(AttrState::from_spec(spec));
        Ok(())
    }

    pub fn delete_attr(&mut self, slot: usize, addr: &AttrAddr) -> SceneResult<()> {
        if addr.segments().len() != 1 || addr.index().is_some() {
            return Err(SceneError::InvalidOperation(
                "only top-level attributes can be deleted".into(),
            ));
        }
        let name = addr.leaf().name.clone();
        let path = self.display_path(slot);
        let rec = self.record_mut(slot)?;
        let pos = rec
            .attrs
            .iter()
            .position(|a| a.spec.name == name)
            .ok_or_else(|| SceneError::AttrNotFound {
                node: path.clone(),
                attr: name.clone(),
            })?;
        if !rec.attrs[pos].spec.removable {
            return Err(SceneError::NotRemovable(format!("{}.{}", path, name)));
        }
        if rec.attrs[pos].locked {
            return Err(SceneError::Locked(format!("{}.{}", path, name)));
        }
        rec.attrs.remove(pos);
        self.connections
            .retain(|c| !(c.from.slot == slot && plug_matches(&c.from.attr, &name))
                && !(c.to.slot == slot && plug_matches(&c.to.attr, &name)));
        Ok(())
    }

    pub fn rename_attr(&mut self, slot: usize, addr: &AttrAddr, new_name: &str) -> SceneResult<()> {
        if addr.segments().len() != 1 || addr.index().is_some() {
            return Err(SceneError::InvalidOperation(
                "only top-level attributes can be renamed".into(),
            ));
        }
        if !is_valid_name(new_name) {
            return Err(SceneError::InvalidName(new_name.to_string()));
        }
        let old = addr.leaf().name.clone();
        let path = self.display_path(slot);
        let rec = self.record_mut(slot)?;
        if rec.attrs.iter().any(|a| a.spec.name == new_name) {
            return Err(SceneError::NameTaken(format!("{}.{}", path, new_name)));
        }
        let state = rec
            .attrs
            .iter_mut()
            .find(|a| a.spec.name == old)
            .ok_or_else(|| SceneError::AttrNotFound {
                node: path.clone(),
                attr: old.clone(),
            })?;
        if !state.spec.removable {
            return Err(SceneError::NotRemovable(format!("{}.{}", path, old)));
        }
        if state.locked {
            return Err(SceneError::Locked(format!("{}.{}", path, old)));
        }
        state.spec.name = new_name.to_string();
        for conn in &mut self.connections {
            for plug in [&mut conn.from, &mut conn.to] {
                if plug.slot == slot && plug_matches(&plug.attr, &old) {
                    let suffix = plug.attr[old.len()..].to_string();
                    plug.attr = format!("{}{}", new_name, suffix);
                }
            }
        }
        Ok(())
    }

    pub fn lock_attr(&mut self, slot: usize, addr: &AttrAddr, locked: bool) -> SceneResult<()> {
        let path = self.display_path(slot);
        let state = self
            .attr_mut(slot, addr)
            .ok_or_else(|| SceneError::AttrNotFound {
                node: path,
                attr: addr.to_string(),
            })?;
        state.locked = locked;
        Ok(())
    }

    /// A slot is locked when it or its compound parent carries the lock bit.
    pub fn attr_locked(&self, slot: usize, addr: &AttrAddr) -> bool {
        self.attr_ref(slot, addr)
            .map(|(state, parent_locked)| state.locked || parent_locked)
            .unwrap_or(false)
    }

    // ==================== Values ====================

    pub fn get_scalar(&self, slot: usize, addr: &AttrAddr) -> SceneResult<Value> {
        let path = self.display_path(slot);
        let not_found = || SceneError::AttrNotFound {
            node: path.clone(),
            attr: addr.to_string(),
        };
        let (state, _) = self.attr_ref(slot, addr).ok_or_else(not_found)?;
        if matches!(state.spec.kind, AttrKind::Reference | AttrKind::Compound) {
            return Err(SceneError::TypeMismatch {
                expected: "literal value".into(),
                actual: kind_name(state.spec.kind).into(),
            });
        }
        if let Some(i) = addr.index() {
            if !state.spec.multi {
                return Err(not_found());
            }
            return state.elements.get(&i).cloned().ok_or_else(not_found);
        }
        if state.spec.multi {
            // Whole-path read of an array slot yields the lowest element.
            return state.elements.values().next().cloned().ok_or_else(not_found);
        }
        state.single.clone().ok_or_else(not_found)
    }

    pub fn set_scalar(&mut self, slot: usize, addr: &AttrAddr, value: Value) -> SceneResult<()> {
        let path = self.display_path(slot);
        let not_found = || SceneError::AttrNotFound {
            node: path.clone(),
            attr: addr.to_string(),
        };
        let (state, parent_locked) = self.attr_ref(slot, addr).ok_or_else(not_found)?;
        if state.locked || parent_locked {
            return Err(SceneError::Locked(format!("{}.{}", path, addr)));
        }
        if addr.index().is_some() && !state.spec.multi {
            return Err(not_found());
        }
        let coerced = coerce(&state.spec, value)?;
        let state = self.attr_mut(slot, addr).expect("checked above");
        if let Some(i) = addr.index() {
            state.elements.insert(i, coerced);
        } else if state.spec.multi {
            let i = state.elements.keys().next().copied().unwrap_or(0);
            state.elements.insert(i, coerced);
        } else {
            state.single = Some(coerced);
        }
        Ok(())
    }

    // ==================== Connections ====================

    /// Create the edge `from -> to`, replacing any existing incoming edge on
    /// the destination plug.
    pub fn connect(
        &mut self,
        from_slot: usize,
        from_addr: &AttrAddr,
        to_slot: usize,
        to_addr: &AttrAddr,
    ) -> SceneResult<()> {
        let from_plug = Plug {
            slot: from_slot,
            attr: from_addr.to_string(),
        };
        let to_plug = Plug {
            slot: to_slot,
            attr: to_addr.to_string(),
        };
        if from_plug == to_plug {
            return Err(SceneError::InvalidOperation(
                "cannot connect a plug to itself".into(),
            ));
        }

        let (from_state, _) = self.attr_ref(from_slot, from_addr).ok_or_else(|| {
            SceneError::AttrNotFound {
                node: self.display_path(from_slot),
                attr: from_addr.to_string(),
            }
        })?;
        let (to_state, to_parent_locked) =
            self.attr_ref(to_slot, to_addr).ok_or_else(|| SceneError::AttrNotFound {
                node: self.display_path(to_slot),
                attr: to_addr.to_string(),
            })?;

        for (state, addr) in [(from_state, from_addr), (to_state, to_addr)] {
            if state.spec.multi && addr.index().is_none() {
                return Err(SceneError::InvalidOperation(format!(
                    "array-capable plug {} requires an element index",
                    addr
                )));
            }
            if !state.spec.multi && addr.index().is_some() {
                return Err(SceneError::InvalidOperation(format!(
                    "plug {} is not array-capable",
                    addr
                )));
            }
        }
        if !kinds_compatible(from_state.spec.kind, to_state.spec.kind) {
            return Err(SceneError::IncompatibleConnection {
                from_plug: format!("{}.{}", self.display_path(from_slot), from_addr),
                to_plug: format!("{}.{}", self.display_path(to_slot), to_addr),
            });
        }
        if to_state.locked || to_parent_locked {
            return Err(SceneError::Locked(format!(
                "{}.{}",
                self.display_path(to_slot),
                to_addr
            )));
        }

        if self
            .connections
            .iter()
            .any(|c| c.from == from_plug && c.to == to_plug)
        {
            return Ok(());
        }
        // A destination plug accepts one incoming edge; a new one replaces it.
        self.connections.retain(|c| c.to != to_plug);
        self.connections.push(ConnRec {
            from: from_plug,
            to: to_plug,
        });
        Ok(())
    }

    /// Remove the exact edge `from -> to`; no-op if it does not exist.
    pub fn disconnect(
        &mut self,
        from_slot: usize,
        from_addr: &AttrAddr,
        to_slot: usize,
        to_addr: &AttrAddr,
    ) -> SceneResult<()> {
        let from = Plug {
            slot: from_slot,
            attr: from_addr.to_string(),
        };
        let to = Plug {
            slot: to_slot,
            attr: to_addr.to_string(),
        };
        self.connections.retain(|c| !(c.from == from && c.to == to));
        Ok(())
    }

    pub fn connected(
        &self,
        from_slot: usize,
        from_addr: &AttrAddr,
        to_slot: usize,
        to_addr: &AttrAddr,
    ) -> bool {
        let from = Plug {
            slot: from_slot,
            attr: from_addr.to_string(),
        };
        let to = Plug {
            slot: to_slot,
            attr: to_addr.to_string(),
        };
        self.connections.iter().any(|c| c.from == from && c.to == to)
    }

    /// Edges touching `slot.attr`, filtered by direction relative to that
    /// plug. Element plugs match their parent attribute; results come back in
    /// ascending element order, then creation order.
    pub fn attr_connections(
        &self,
        slot: usize,
        addr: &AttrAddr,
        direction: Direction,
    ) -> Vec<Connection> {
        let query = addr.to_string();
        let mut hits: Vec<(usize, usize, Connection)> = Vec::new();
        for (seq, conn) in self.connections.iter().enumerate() {
            let ours = if direction.wants_incoming()
                && conn.to.slot == slot
                && plug_matches(&conn.to.attr, &query)
            {
                Some(&conn.to)
            } else if direction.wants_outgoing()
                && conn.from.slot == slot
                && plug_matches(&conn.from.attr, &query)
            {
                Some(&conn.from)
            } else {
                None
            };
            if let Some(plug) = ours {
                let key = element_index(&plug.attr, &query).unwrap_or(usize::MAX);
                if let Some(conn) = self.to_connection(conn) {
                    hits.push((key, seq, conn));
                }
            }
        }
        hits.sort_by_key(|(key, seq, _)| (*key, *seq));
        hits.into_iter().map(|(_, _, c)| c).collect()
    }

    /// Edges touching any attribute of `slot`, in creation order.
    pub fn node_connections(&self, slot: usize, direction: Direction) -> Vec<Connection> {
        self.connections
            .iter()
            .filter(|c| {
                (direction.wants_incoming() && c.to.slot == slot)
                    || (direction.wants_outgoing() && c.from.slot == slot)
            })
            .filter_map(|c| self.to_connection(c))
            .collect()
    }

    // ==================== Internal ====================

    fn record(&self, slot: usize) -> SceneResult<&NodeRecord> {
        self.slots
            .get(slot)
            .and_then(|s| s.as_ref())
            .ok_or_else(|| SceneError::NodeNotFound(format!("slot {}", slot)))
    }

    fn record_mut(&mut self, slot: usize) -> SceneResult<&mut NodeRecord> {
        self.slots
            .get_mut(slot)
            .and_then(|s| s.as_mut())
            .ok_or_else(|| SceneError::NodeNotFound(format!("slot {}", slot)))
    }

    fn leaf_name(&self, slot: usize) -> String {
        self.record(slot).map(|r| r.name.clone()).unwrap_or_default()
    }

    fn display_path(&self, slot: usize) -> String {
        self.full_path(slot)
            .unwrap_or_else(|| format!("slot {}", slot))
    }

    fn roots(&self) -> Vec<usize> {
        self.live_slots()
            .into_iter()
            .filter(|&s| {
                self.record(s)
                    .map(|r| r.hierarchical && r.parent.is_none())
                    .unwrap_or(false)
            })
            .collect()
    }

    fn name_taken(&self, name: &str) -> bool {
        self.live_slots()
            .into_iter()
            .any(|s| self.leaf_name(s) == name)
    }

    fn counted_name(&self, base: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{}{}", base, n);
            if !self.name_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn subtree(&self, slot: usize) -> Vec<usize> {
        let mut out = vec![slot];
        let mut stack = self.children(slot);
        while let Some(s) = stack.pop() {
            out.push(s);
            stack.extend(self.children(s));
        }
        out
    }

    /// Remove the seed set plus any unlocked auxiliary helpers transitively
    /// connected to it, then drop every edge touching a removed slot.
    fn cascade_and_remove(&mut self, seeds: HashSet<usize>) {
        let mut doomed = seeds;
        let mut queue: Vec<usize> = doomed.iter().copied().collect();
        while let Some(s) = queue.pop() {
            let peers: Vec<usize> = self
                .connections
                .iter()
                .filter(|c| c.from.slot == s || c.to.slot == s)
                .map(|c| if c.from.slot == s { c.to.slot } else { c.from.slot })
                .collect();
            for peer in peers {
                if doomed.contains(&peer) {
                    continue;
                }
                if let Ok(rec) = self.record(peer) {
                    if rec.auxiliary && !rec.locked {
                        doomed.insert(peer);
                        queue.push(peer);
                    }
                }
            }
        }

        self.connections
            .retain(|c| !doomed.contains(&c.from.slot) && !doomed.contains(&c.to.slot));
        let parents_to_fix: Vec<(usize, usize)> = doomed
            .iter()
            .filter_map(|&s| {
                self.record(s)
                    .ok()
                    .and_then(|r| r.parent)
                    .filter(|p| !doomed.contains(p))
                    .map(|p| (p, s))
            })
            .collect();
        for (parent, child) in parents_to_fix {
            if let Ok(rec) = self.record_mut(parent) {
                rec.children.retain(|&c| c != child);
            }
        }
        for &s in &doomed {
            if let Some(rec) = self.slots[s].take() {
                self.uuid_index.remove(&rec.uuid);
            }
        }
    }

    fn attr_ref(&self, slot: usize, addr: &AttrAddr) -> Option<(&AttrState, bool)> {
        let rec = self.slots.get(slot)?.as_ref()?;
        let segs = addr.segments();
        let top = rec.attrs.iter().find(|a| a.spec.name == segs[0].name)?;
        match segs.len() {
            1 => Some((top, false)),
            // One compound level: parent[index] addressing is not modeled.
            2 if segs[0].index.is_none() => {
                let child = top.children.iter().find(|c| c.spec.name == segs[1].name)?;
                Some((child, top.locked))
            }
            _ => None,
        }
    }

    fn attr_mut(&mut self, slot: usize, addr: &AttrAddr) -> Option<&mut AttrState> {
        let rec = self.slots.get_mut(slot)?.as_mut()?;
        let segs = addr.segments();
        let ti = rec.attrs.iter().position(|a| a.spec.name == segs[0].name)?;
        match segs.len() {
            1 => rec.attrs.get_mut(ti),
            2 if segs[0].index.is_none() => {
                let top = &mut rec.attrs[ti];
                let ci = top.children.iter().position(|c| c.spec.name == segs[1].name)?;
                top.children.get_mut(ci)
            }
            _ => None,
        }
    }

    fn to_connection(&self, conn: &ConnRec) -> Option<Connection> {
        Some(Connection::new(
            PlugRef::new(self.full_path(conn.from.slot)?, conn.from.attr.clone()),
            PlugRef::new(self.full_path(conn.to.slot)?, conn.to.attr.clone()),
        ))
    }
}

fn validate_spec_names(spec: &AttrSpec) -> SceneResult<()> {
    if !is_valid_name(&spec.name) {
        return Err(SceneError::InvalidName(spec.name.clone()));
    }
    for child in &spec.children {
        validate_spec_names(child)?;
    }
    Ok(())
}

fn coerce(spec: &AttrSpec, value: Value) -> SceneResult<Value> {
    match (spec.kind, &value) {
        (AttrKind::Scalar(ScalarKind::Float), Value::Float(_)) => Ok(value),
        (AttrKind::Scalar(ScalarKind::Float), Value::Int(i)) => Ok(Value::Float(*i as f64)),
        (AttrKind::Scalar(ScalarKind::Int), Value::Int(_)) => Ok(value),
        (AttrKind::Scalar(ScalarKind::Enum), Value::Int(_)) => Ok(value),
        (AttrKind::Scalar(ScalarKind::Bool), Value::Bool(_)) => Ok(value),
        (AttrKind::Text, Value::String(_)) => Ok(value),
        _ => Err(SceneError::TypeMismatch {
            expected: kind_name(spec.kind).into(),
            actual: value.type_name().into(),
        }),
    }
}

fn kinds_compatible(from: AttrKind, to: AttrKind) -> bool {
    match (from, to) {
        (AttrKind::Reference, AttrKind::Reference) => true,
        // Reference slots may feed string slots; the connection then takes
        // precedence over the literal content on reads.
        (AttrKind::Reference, AttrKind::Text) => true,
        (AttrKind::Text, AttrKind::Text) => true,
        (AttrKind::Scalar(_), AttrKind::Scalar(_)) => true,
        _ => false,
    }
}

/// True when a stored plug path addresses `query` itself, one of its
/// elements, or one of its children.
fn plug_matches(plug_attr: &str, query: &str) -> bool {
    plug_attr == query
        || (plug_attr.starts_with(query)
            && matches!(plug_attr.as_bytes().get(query.len()), Some(b'[') | Some(b'.')))
}

/// Element index of a plug relative to the queried attribute path.
fn element_index(plug_attr: &str, query: &str) -> Option<usize> {
    let rest = plug_attr.strip_prefix(query)?;
    let rest = rest.strip_prefix('[')?;
    let close = rest.find(']')?;
    rest[..close].parse().ok()
}
