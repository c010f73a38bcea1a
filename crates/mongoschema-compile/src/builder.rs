use mongoschema_core::{DeclarationGraph, PropertyDeclaration, RecordDeclaration, TypeReference};

use crate::classify::classify;
use crate::defaults::default_fragment;
use crate::errors::{CompileError, Result};
use crate::node::{BsonType, Properties, SchemaNode};
use crate::registry::{ConstraintKey, ConstraintRegistry};

/// Recursive schema builder over an immutable graph and registry.
#[derive(Debug, Clone, Copy)]
pub struct SchemaBuilder<'a> {
    graph: &'a DeclarationGraph,
    registry: &'a ConstraintRegistry,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(graph: &'a DeclarationGraph, registry: &'a ConstraintRegistry) -> Self {
        Self { graph, registry }
    }

    /// Build the full schema node of `record`, inlining nested records.
    pub fn build(&self, record: &RecordDeclaration) -> Result<SchemaNode> {
        let mut path = Vec::new();
        self.build_record(record, &mut path)
    }

    fn build_record(&self, record: &RecordDeclaration, path: &mut Vec<String>) -> Result<SchemaNode> {
        path.push(record.name.clone());

        let mut required = Vec::new();
        let mut properties = Properties::default();

        for property in &record.properties {
            let key = ConstraintKey::new(&record.name, &property.name);
            if !property.nullable {
                required.push(property.name.clone());
            }
            let node = self.build_property(&key, property, path)?;
            properties.insert(property.name.clone(), node);
        }

        path.pop();
        Ok(SchemaNode::object(required, properties))
    }

    fn build_property(
        &self,
        key: &ConstraintKey,
        property: &PropertyDeclaration,
        path: &mut Vec<String>,
    ) -> Result<SchemaNode> {
        let tag = classify(&property.type_ref);

        // Nested records are inlined as-is: no widening, no constraints.
        if let TypeReference::Record(name) = &property.type_ref {
            let nested = self.nested_record(key, name, path)?;
            return self.build_record(nested, path);
        }

        let bson_type = if property.nullable {
            BsonType::nullable(tag)
        } else {
            BsonType::required(tag)
        };
        let mut node = SchemaNode::typed(bson_type);

        let explicit = self.registry.fragment(key);
        let mut is_enum = false;

        if let TypeReference::Enum(name) = &property.type_ref {
            let decl = self.graph.enum_declaration(name).ok_or_else(|| {
                CompileError::UnresolvedType {
                    key: key.clone(),
                    type_name: name.clone(),
                }
            })?;
            let mut values: Vec<Option<String>> = decl.values.iter().cloned().map(Some).collect();
            if property.nullable {
                values.push(None);
            }
            node.enum_values = Some(values);
            is_enum = true;
        }

        if let Some(fragment) = explicit {
            fragment.apply_to(&mut node);
        } else if !is_enum && !self.registry.is_exempt(key) {
            if let Some(fragment) = default_fragment(&property.name, tag) {
                fragment.apply_to(&mut node);
            }
        }

        if let TypeReference::Array(element) = &property.type_ref {
            node.items = Some(Box::new(self.build_items(key, element, path)?));
        }

        Ok(node)
    }

    /// Element schema of a list: nested records are built in full, anything
    /// else contributes its type tag only.
    fn build_items(
        &self,
        key: &ConstraintKey,
        element: &TypeReference,
        path: &mut Vec<String>,
    ) -> Result<SchemaNode> {
        match element {
            TypeReference::Record(name) => {
                let nested = self.nested_record(key, name, path)?;
                self.build_record(nested, path)
            }
            TypeReference::Enum(name) if self.graph.enum_declaration(name).is_none() => {
                Err(CompileError::UnresolvedType {
                    key: key.clone(),
                    type_name: name.clone(),
                })
            }
            other => Ok(SchemaNode::typed(BsonType::required(classify(other)))),
        }
    }

    fn nested_record(
        &self,
        key: &ConstraintKey,
        name: &str,
        path: &[String],
    ) -> Result<&'a RecordDeclaration> {
        let record = self
            .graph
            .record(name)
            .ok_or_else(|| CompileError::UnresolvedType {
                key: key.clone(),
                type_name: name.to_string(),
            })?;

        if path.iter().any(|seen| seen == name) {
            let mut cycle = path.to_vec();
            cycle.push(name.to_string());
            return Err(CompileError::CyclicNesting {
                key: key.clone(),
                path: cycle,
            });
        }

        Ok(record)
    }
}
