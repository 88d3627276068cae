//! Identity types for scene entities.
//!
//! Two different notions of identity exist side by side:
//! - [`SceneUuid`] is the persistent identifier assigned by the scene service.
//!   It survives rename and reparent, but not delete + recreate.
//! - [`NativeHandle`] is a transient reference to an entity slot. External
//!   mutation may invalidate it at any time, after which the entity must be
//!   re-resolved through its [`SceneUuid`].

use std::fmt;
use uuid::Uuid;

/// Persistent identifier for one scene entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneUuid(Uuid);

impl SceneUuid {
    /// Wrap a raw uuid reported by the scene service.
    pub fn new(raw: Uuid) -> Self {
        Self(raw)
    }

    /// Mint a fresh identifier. Only scene services assign identifiers;
    /// client code reads them back via [`crate::SceneService::uuid_of`].
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the raw uuid.
    pub fn raw(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SceneUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque, possibly-stale reference to one entity slot in the scene service.
///
/// A handle is not an identity. The generation counter lets the service
/// invalidate outstanding handles without reusing slot numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle {
    slot: u64,
    generation: u64,
}

impl NativeHandle {
    /// Create a handle from its raw parts.
    pub fn new(slot: u64, generation: u64) -> Self {
        Self { slot, generation }
    }

    /// The slot number inside the scene service.
    pub fn slot(&self) -> u64 {
        self.slot
    }

    /// The generation the slot had when this handle was issued.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}g{}", self.slot, self.generation)
    }
}

/// A freshly resolved handle, classified by the shape of the entity behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedHandle {
    /// Entity with parent/child structure, addressed by a `|`-separated path.
    Hierarchical(NativeHandle),
    /// Entity without hierarchy, addressed by its bare name.
    Flat(NativeHandle),
}

impl ResolvedHandle {
    /// The underlying handle, whichever shape it has.
    pub fn handle(&self) -> NativeHandle {
        match self {
            ResolvedHandle::Hierarchical(h) | ResolvedHandle::Flat(h) => *h,
        }
    }

    /// Returns true for entities with parent/child structure.
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, ResolvedHandle::Hierarchical(_))
    }
}
