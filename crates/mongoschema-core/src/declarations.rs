use std::collections::{BTreeMap, BTreeSet};

use crate::annotations::RawAnnotation;
use crate::types::TypeReference;

/// Marker for records that produce a top-level validation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRoot {
    /// Logical collection name; `None` when the provider could not resolve it.
    pub collection_name: Option<String>,
}

/// Enumeration with its literal values in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDeclaration {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumDeclaration {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single property of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeclaration {
    pub name: String,
    pub type_ref: TypeReference,
    /// Nullable properties are optional in the derived schema.
    pub nullable: bool,
    pub annotations: Vec<RawAnnotation>,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>, type_ref: TypeReference) -> Self {
        Self {
            name: name.into(),
            type_ref,
            nullable: false,
            annotations: Vec::new(),
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn annotated(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A named record type with ordered properties.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDeclaration {
    /// Fully-qualified name; the record's identity.
    pub name: String,
    pub schema_root: Option<SchemaRoot>,
    pub properties: Vec<PropertyDeclaration>,
}

impl RecordDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_root: None,
            properties: Vec::new(),
        }
    }

    /// Mark the record as schema-rooted under `collection_name`.
    pub fn rooted(mut self, collection_name: impl Into<String>) -> Self {
        self.schema_root = Some(SchemaRoot {
            collection_name: Some(collection_name.into()),
        });
        self
    }

    pub fn property(mut self, property: PropertyDeclaration) -> Self {
        self.properties.push(property);
        self
    }

    pub fn is_schema_root(&self) -> bool {
        self.schema_root.is_some()
    }

    /// Last segment of the fully-qualified name.
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit(['.', ':'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Fully materialized declaration graph handed to the compiler.
#[derive(Debug, Clone, Default)]
pub struct DeclarationGraph {
    records: Vec<RecordDeclaration>,
    enums: Vec<EnumDeclaration>,
    pending: BTreeSet<String>,
    record_index: BTreeMap<String, usize>,
    enum_index: BTreeMap<String, usize>,
}

impl DeclarationGraph {
    pub fn new(records: Vec<RecordDeclaration>, enums: Vec<EnumDeclaration>) -> Self {
        let mut record_index = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            record_index.entry(record.name.clone()).or_insert(idx);
        }

        let mut enum_index = BTreeMap::new();
        for (idx, decl) in enums.iter().enumerate() {
            enum_index.entry(decl.name.clone()).or_insert(idx);
        }

        Self {
            records,
            enums,
            pending: BTreeSet::new(),
            record_index,
            enum_index,
        }
    }

    /// Records the provider could not fully resolve yet.
    pub fn with_pending<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn records(&self) -> &[RecordDeclaration] {
        &self.records
    }

    pub fn enums(&self) -> &[EnumDeclaration] {
        &self.enums
    }

    pub fn record(&self, name: &str) -> Option<&RecordDeclaration> {
        self.record_index.get(name).map(|idx| &self.records[*idx])
    }

    pub fn enum_declaration(&self, name: &str) -> Option<&EnumDeclaration> {
        self.enum_index.get(name).map(|idx| &self.enums[*idx])
    }

    /// Whether `name` resolves to any record or enum declaration.
    pub fn contains(&self, name: &str) -> bool {
        self.record_index.contains_key(name) || self.enum_index.contains_key(name)
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.contains(name)
    }

    /// Schema-rooted records in declaration order.
    pub fn schema_roots(&self) -> impl Iterator<Item = &RecordDeclaration> {
        self.records.iter().filter(|record| record.is_schema_root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Primitive, TypeReference};

    #[test]
    fn simple_name_strips_qualifiers() {
        assert_eq!(RecordDeclaration::new("com.acme.model.User").simple_name(), "User");
        assert_eq!(RecordDeclaration::new("crate::model::Order").simple_name(), "Order");
        assert_eq!(RecordDeclaration::new("Plain").simple_name(), "Plain");
    }

    #[test]
    fn lookups_resolve_records_and_enums() {
        let graph = DeclarationGraph::new(
            vec![
                RecordDeclaration::new("User")
                    .rooted("users")
                    .property(PropertyDeclaration::new(
                        "name",
                        TypeReference::primitive(Primitive::String),
                    )),
                RecordDeclaration::new("Address"),
            ],
            vec![EnumDeclaration::new("Role", ["ADMIN", "USER"])],
        )
        .with_pending(["Draft"]);

        assert!(graph.record("Address").is_some());
        assert!(graph.enum_declaration("Role").is_some());
        assert!(graph.contains("Role"));
        assert!(!graph.contains("Draft"));
        assert!(graph.is_pending("Draft"));
        let roots: Vec<&str> = graph.schema_roots().map(|record| record.name.as_str()).collect();
        assert_eq!(roots, vec!["User"]);
    }
}
