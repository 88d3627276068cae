//! scenekit Object Layer
//!
//! Identity-stable wrappers over an externally-owned scene graph. Callers
//! hold long-lived [`SceneNode`] handles that stay valid, and stay singleton
//! per entity, while the host renames, reparents, and otherwise churns the
//! native handles underneath.
//!
//! The pieces:
//! - [`NodeRegistry`] — process-wide uuid -> weak-wrapper cache
//! - [`SceneNode`] — one wrapper per live entity, with transparent handle
//!   re-resolution
//! - [`AttrPath`] — chainable, lazily-validated attribute paths
//! - [`AttrValue`] — classification-driven read results
//! - [`delete_node`] / [`delete_many`] — lock-preserving deletion
//! - [`SceneSession`] — construction entry points over one scene service
//!
//! Lookup failures never panic and never return `Err`: a missing entity or
//! attribute resolves to an absent value and a `tracing` warning. Only
//! constructor misuse (unknown node type, malformed name) is an error.

mod attr;
mod get;
mod node;
mod ops;
mod registry;
mod session;

pub use attr::AttrPath;
pub use get::AttrValue;
pub use node::SceneNode;
pub use ops::{delete_many, delete_node};
pub use registry::NodeRegistry;
pub use session::SceneSession;
