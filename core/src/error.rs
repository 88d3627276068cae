//! Common error types.
//!
//! Only a small subset of these is ever surfaced as `Err` to callers of the
//! object layer: constructor argument problems (unknown type, invalid name)
//! are programmer errors and raise, while lookup and attribute-usage failures
//! are reported as warnings and resolve into absent values.

use thiserror::Error;

/// Errors produced by scene services and the object layer.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Requested node type is not a recognized kind.
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Entity or attribute name rejected by the naming rules.
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// Node path does not currently resolve.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Attribute path does not currently resolve.
    #[error("Attribute not found: {attr} on {node}")]
    AttrNotFound { node: String, attr: String },

    /// Written value incompatible with the attribute's declared kind.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Connection endpoints carry incompatible kinds.
    #[error("Incompatible connection: {from_plug} -> {to_plug}")]
    IncompatibleConnection { from_plug: String, to_plug: String },

    /// Entity or attribute is locked against the requested mutation.
    #[error("Locked: {0}")]
    Locked(String),

    /// Built-in attribute cannot be removed or renamed.
    #[error("Attribute is not removable: {0}")]
    NotRemovable(String),

    /// Requested name is already in use.
    #[error("Name already in use: {0}")]
    NameTaken(String),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
