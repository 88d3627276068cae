//! Node type schema for the reference scene.

use crate::path::is_valid_name;
use scenekit_core::{AttrSpec, SceneError, SceneResult};
use std::collections::HashMap;

/// Node type definition.
#[derive(Debug, Clone)]
pub struct NodeTypeDef {
    /// Type name.
    pub name: String,
    /// Whether instances participate in the parent/child hierarchy.
    pub hierarchical: bool,
    /// Auxiliary helper types cascade-delete together with the nodes they
    /// are connected to, unless locked at deletion time.
    pub auxiliary: bool,
    /// Attribute declarations, in declared order.
    pub attrs: Vec<AttrSpec>,
}

impl NodeTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hierarchical: false,
            auxiliary: false,
            attrs: Vec::new(),
        }
    }

    pub fn hierarchical(mut self) -> Self {
        self.hierarchical = true;
        self
    }

    pub fn auxiliary(mut self) -> Self {
        self.auxiliary = true;
        self
    }

    pub fn with_attr(mut self, spec: AttrSpec) -> Self {
        self.attrs.push(spec);
        self
    }

    /// Get an attribute declaration by name.
    pub fn get_attr(&self, name: &str) -> Option<&AttrSpec> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

/// Runtime lookup of node type definitions. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Schema {
    types: HashMap<String, NodeTypeDef>,
}

impl Schema {
    /// Get a type definition by name.
    pub fn get(&self, name: &str) -> Option<&NodeTypeDef> {
        self.types.get(name)
    }

    /// Returns true if the type name is known.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// The schema the test suite and demos run against. Covers every
    /// classification the resolver knows: hierarchical and flat types,
    /// scalar/string/reference/compound slots, array cardinality, and an
    /// auxiliary helper type.
    pub fn standard() -> Self {
        let transform_attrs = || {
            let mut attrs = vec![];
            for name in ["tx", "ty", "tz", "rx", "ry", "rz"] {
                attrs.push(AttrSpec::float(name).builtin().with_default(0.0));
            }
            for name in ["sx", "sy", "sz"] {
                attrs.push(AttrSpec::float(name).builtin().with_default(1.0));
            }
            attrs.push(AttrSpec::bool("visibility").builtin().with_default(true));
            attrs.push(
                AttrSpec::compound(
                    "pivot",
                    vec![
                        AttrSpec::float("pivotX").with_default(0.0),
                        AttrSpec::float("pivotY").with_default(0.0),
                        AttrSpec::float("pivotZ").with_default(0.0),
                    ],
                )
                .builtin(),
            );
            attrs.push(AttrSpec::reference("message").builtin());
            attrs
        };

        SchemaBuilder::new()
            .node_type({
                let mut def = NodeTypeDef::new("group").hierarchical();
                for attr in transform_attrs() {
                    def = def.with_attr(attr);
                }
                def
            })
            .node_type({
                let mut def = NodeTypeDef::new("locator").hierarchical();
                for attr in transform_attrs() {
                    def = def.with_attr(attr);
                }
                def
            })
            .node_type(
                NodeTypeDef::new("network")
                    .with_attr(AttrSpec::text("label").builtin().with_default(""))
                    .with_attr(AttrSpec::enumeration("state").builtin().with_default(0))
                    .with_attr(AttrSpec::reference("message").builtin()),
            )
            .node_type(
                NodeTypeDef::new("collector")
                    .with_attr(AttrSpec::reference("target").multi().builtin())
                    .with_attr(AttrSpec::text("label").builtin().with_default(""))
                    .with_attr(AttrSpec::reference("message").builtin()),
            )
            .node_type(
                NodeTypeDef::new("adder")
                    .with_attr(AttrSpec::float("values").multi().builtin())
                    .with_attr(
                        AttrSpec::compound(
                            "input",
                            vec![
                                AttrSpec::float("inputA").with_default(0.0),
                                AttrSpec::float("inputB").with_default(0.0),
                            ],
                        )
                        .builtin(),
                    )
                    .with_attr(AttrSpec::float("output").builtin().with_default(0.0))
                    .with_attr(AttrSpec::reference("message").builtin()),
            )
            .node_type(
                NodeTypeDef::new("converter")
                    .auxiliary()
                    .with_attr(AttrSpec::float("input").builtin().with_default(0.0))
                    .with_attr(AttrSpec::float("output").builtin().with_default(0.0))
                    .with_attr(AttrSpec::float("factor").builtin().with_default(1.0))
                    .with_attr(AttrSpec::reference("message").builtin()),
            )
            .build()
            .expect("standard schema is well-formed")
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<NodeTypeDef>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_type(mut self, def: NodeTypeDef) -> Self {
        self.types.push(def);
        self
    }

    /// Validate names and build the schema.
    pub fn build(self) -> SceneResult<Schema> {
        let mut types = HashMap::new();
        for def in self.types {
            if !is_valid_name(&def.name) {
                return Err(SceneError::InvalidName(def.name));
            }
            for attr in &def.attrs {
                validate_attr(attr)?;
            }
            if types.contains_key(&def.name) {
                return Err(SceneError::NameTaken(def.name));
            }
            types.insert(def.name.clone(), def);
        }
        Ok(Schema { types })
    }
}

fn validate_attr(spec: &AttrSpec) -> SceneResult<()> {
    if !is_valid_name(&spec.name) {
        return Err(SceneError::InvalidName(spec.name.clone()));
    }
    for child in &spec.children {
        validate_attr(child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenekit_core::{AttrKind, ScalarKind};

    #[test]
    fn test_standard_schema_lookups() {
        let schema = Schema::standard();
        let group = schema.get("group").expect("group type");
        assert!(group.hierarchical);
        assert!(!group.auxiliary);
        assert_eq!(
            group.get_attr("tx").map(|a| a.kind),
            Some(AttrKind::Scalar(ScalarKind::Float))
        );
        assert!(schema.get("converter").unwrap().auxiliary);
        assert!(schema.get("collector").unwrap().get_attr("target").unwrap().multi);
    }

    #[test]
    fn test_builder_rejects_bad_names() {
        let result = SchemaBuilder::new()
            .node_type(NodeTypeDef::new("not a name"))
            .build();
        assert!(matches!(result, Err(SceneError::InvalidName(_))));
    }

    #[test]
    fn test_compound_children_declared_order() {
        let schema = Schema::standard();
        let pivot = schema.get("group").unwrap().get_attr("pivot").unwrap();
        let names: Vec<_> = pivot.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["pivotX", "pivotY", "pivotZ"]);
    }
}
