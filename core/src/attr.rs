//! Attribute classification vocabulary.
//!
//! The value resolver and the scene service agree on four value-kinds:
//! reference (connection-carrying), string, compound (named sub-attributes),
//! and scalar. Array cardinality is orthogonal to the kind: any reference or
//! scalar slot may be multi (zero or more indexed elements).

use crate::Value;

/// Scalar payload families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    /// Integer-indexed enumeration.
    Enum,
}

/// The value-kind of an attribute slot, as reported by the scene service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// Connection-carrying slot; its effective value is the connected entity.
    Reference,
    /// Literal text. May alternatively carry a connection, in which case the
    /// connection takes precedence over the literal content.
    Text,
    /// Named sub-attributes in declared order.
    Compound,
    /// Numeric, boolean, or enum payload.
    Scalar(ScalarKind),
}

impl AttrKind {
    /// Returns true for connection-carrying slots.
    pub fn is_reference(&self) -> bool {
        matches!(self, AttrKind::Reference)
    }

    /// Returns true for string slots.
    pub fn is_text(&self) -> bool {
        matches!(self, AttrKind::Text)
    }

    /// Returns true for compound slots.
    pub fn is_compound(&self) -> bool {
        matches!(self, AttrKind::Compound)
    }

    /// Returns true for scalar slots.
    pub fn is_scalar(&self) -> bool {
        matches!(self, AttrKind::Scalar(_))
    }
}

/// Connection direction relative to an attribute: incoming edges end at it,
/// outgoing edges start at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
    Both,
}

impl Direction {
    /// Returns true if edges ending at the attribute are wanted.
    pub fn wants_incoming(&self) -> bool {
        matches!(self, Direction::Incoming | Direction::Both)
    }

    /// Returns true if edges starting at the attribute are wanted.
    pub fn wants_outgoing(&self) -> bool {
        matches!(self, Direction::Outgoing | Direction::Both)
    }
}

/// Declaration of one attribute slot.
///
/// Used both by scene services to describe the attributes a node type carries
/// and by clients adding dynamic attributes to a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrSpec {
    /// Attribute name.
    pub name: String,
    /// Value-kind of the slot.
    pub kind: AttrKind,
    /// Whether the slot has array cardinality (indexed elements).
    pub multi: bool,
    /// Whether the attribute can be deleted. Built-in attributes are not
    /// removable; dynamic attributes are.
    pub removable: bool,
    /// Default value for scalar and string slots.
    pub default: Option<Value>,
    /// Sub-attribute declarations, in declared order (compound slots only).
    pub children: Vec<AttrSpec>,
}

impl AttrSpec {
    pub fn new(name: impl Into<String>, kind: AttrKind) -> Self {
        Self {
            name: name.into(),
            kind,
            multi: false,
            removable: true,
            default: None,
            children: Vec::new(),
        }
    }

    /// Shorthand for a float scalar slot.
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, AttrKind::Scalar(ScalarKind::Float))
    }

    /// Shorthand for an integer scalar slot.
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, AttrKind::Scalar(ScalarKind::Int))
    }

    /// Shorthand for a boolean scalar slot.
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, AttrKind::Scalar(ScalarKind::Bool))
    }

    /// Shorthand for an enum scalar slot.
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, AttrKind::Scalar(ScalarKind::Enum))
    }

    /// Shorthand for a string slot.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, AttrKind::Text)
    }

    /// Shorthand for a reference slot.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(name, AttrKind::Reference)
    }

    /// Shorthand for a compound slot with the given children.
    pub fn compound(name: impl Into<String>, children: Vec<AttrSpec>) -> Self {
        let mut spec = Self::new(name, AttrKind::Compound);
        spec.children = children;
        spec
    }

    /// Mark the slot as array-capable.
    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Mark the attribute as a non-removable built-in.
    pub fn builtin(mut self) -> Self {
        self.removable = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_filters() {
        assert!(Direction::Incoming.wants_incoming());
        assert!(!Direction::Incoming.wants_outgoing());
        assert!(Direction::Both.wants_incoming() && Direction::Both.wants_outgoing());
    }

    #[test]
    fn test_spec_builder_chain() {
        let spec = AttrSpec::float("tx").builtin().with_default(0.0);
        assert_eq!(spec.kind, AttrKind::Scalar(ScalarKind::Float));
        assert!(!spec.removable);
        assert_eq!(spec.default, Some(Value::Float(0.0)));
    }

    #[test]
    fn test_compound_children_keep_declared_order() {
        let spec = AttrSpec::compound(
            "pivot",
            vec![AttrSpec::float("pivotX"), AttrSpec::float("pivotY")],
        );
        let names: Vec<_> = spec.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["pivotX", "pivotY"]);
    }
}
