//! scenekit Core Types
//!
//! This crate provides the foundational types shared by the scenekit layers:
//! - Identity types (SceneUuid, NativeHandle, ResolvedHandle)
//! - Attribute classification (AttrKind, ScalarKind, AttrSpec, Direction)
//! - Value types (the scalar Value enum)
//! - Common error types
//! - The SceneService trait, the seam to the external graph service

mod attr;
mod error;
mod id;
mod service;
mod value;

pub use attr::*;
pub use error::*;
pub use id::*;
pub use service::*;
pub use value::*;
