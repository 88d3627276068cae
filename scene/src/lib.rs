//! scenekit Reference Scene
//!
//! An in-memory implementation of the `SceneService` trait, plus the schema
//! types used to describe node types and their attributes. This is the scene
//! the test suite runs against; embedders talking to a real host platform
//! supply their own `SceneService` instead.
//!
//! The reference scene deliberately reproduces the awkward corners of real
//! hosts that the object layer has to tolerate: rename and reparent
//! invalidate outstanding native handles, probing the cardinality of an
//! untouched array attribute materializes index 0, deleting a node drags
//! unlocked auxiliary helpers along with it, and locked nodes refuse
//! deletion outright.

mod graph;
mod path;
mod schema;
mod service;

pub use graph::SceneGraph;
pub use path::{AttrAddr, AttrSegment};
pub use schema::{NodeTypeDef, Schema, SchemaBuilder};
pub use service::MemoryScene;
