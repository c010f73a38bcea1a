use std::collections::BTreeSet;

use mongoschema_core::{
    DeclarationGraph, EnumDeclaration, Primitive, PropertyDeclaration, RawAnnotation,
    RecordDeclaration, SchemaRoot, TypeReference,
};
use thiserror::Error;

use crate::errors::{ValidationIssue, ValidationReport};
use crate::model::{Descriptor, PropertyEntry, RecordEntry};

const LIST_PREFIX: &str = "List<";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeNameError {
    #[error("type name is empty")]
    Empty,
    #[error("malformed type name: {0}")]
    Malformed(String),
}

/// Resolve a declared type string.
///
/// Primitive names go through the fixed dispatch table, `List<T>` recurses
/// into `T`, names in `enums` become enum references and everything else is
/// taken as a nested record reference.
pub fn parse_type_name(
    type_name: &str,
    enums: &BTreeSet<&str>,
) -> std::result::Result<TypeReference, TypeNameError> {
    let name = type_name.trim();
    if name.is_empty() {
        return Err(TypeNameError::Empty);
    }

    if let Some(rest) = name.strip_prefix(LIST_PREFIX) {
        let element = rest
            .strip_suffix('>')
            .ok_or_else(|| TypeNameError::Malformed(name.to_string()))?;
        return parse_type_name(element, enums).map(TypeReference::array);
    }

    if name.contains(['<', '>', ',']) || name.chars().any(char::is_whitespace) {
        return Err(TypeNameError::Malformed(name.to_string()));
    }

    Ok(match Primitive::from_type_name(name) {
        Some(primitive) => TypeReference::primitive(primitive),
        None if enums.contains(name) => TypeReference::enumeration(name),
        None => TypeReference::record(name),
    })
}

/// Map a deserialized descriptor into a declaration graph.
///
/// Type name problems are pushed to `report` with the offending pointer;
/// the affected property is left out of the graph.
pub fn build_graph(descriptor: &Descriptor, report: &mut ValidationReport) -> DeclarationGraph {
    let enum_names: BTreeSet<&str> = descriptor
        .enums
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();

    let records = descriptor
        .records
        .iter()
        .enumerate()
        .map(|(idx, entry)| map_record(idx, entry, &enum_names, report))
        .collect();

    let enums = descriptor
        .enums
        .iter()
        .map(|entry| EnumDeclaration::new(entry.name.clone(), entry.values.iter().cloned()))
        .collect();

    let declared: BTreeSet<&str> = descriptor
        .records
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    for (idx, name) in descriptor.pending.iter().enumerate() {
        if !declared.contains(name.as_str()) {
            report.push_warning(ValidationIssue::warning(
                "pending_unknown_record",
                format!("/pending/{idx}"),
                format!("pending record '{name}' is not declared"),
                Some("remove it from pending or declare the record".to_string()),
            ));
        }
    }

    DeclarationGraph::new(records, enums).with_pending(descriptor.pending.iter().cloned())
}

fn map_record(
    idx: usize,
    entry: &RecordEntry,
    enums: &BTreeSet<&str>,
    report: &mut ValidationReport,
) -> RecordDeclaration {
    let mut record = RecordDeclaration::new(entry.name.clone());
    record.schema_root = entry.schema_root.as_ref().map(|root| SchemaRoot {
        collection_name: root.collection_name.clone(),
    });

    for (prop_idx, property) in entry.properties.iter().enumerate() {
        let path = format!("/records/{idx}/properties/{prop_idx}/type");
        match map_property(property, enums) {
            Ok(declaration) => record.properties.push(declaration),
            Err(err) => report.push_error(ValidationIssue::error(
                "invalid_type_name",
                path,
                format!("{}#{}: {err}", entry.name, property.name),
                Some("use a primitive name, List<T>, an enum or a record name".to_string()),
            )),
        }
    }

    record
}

fn map_property(
    entry: &PropertyEntry,
    enums: &BTreeSet<&str>,
) -> std::result::Result<PropertyDeclaration, TypeNameError> {
    let type_ref = parse_type_name(&entry.type_name, enums)?;
    let mut property = PropertyDeclaration::new(entry.name.clone(), type_ref);
    property.nullable = entry.nullable;
    property.annotations = entry
        .annotations
        .iter()
        .map(|annotation| RawAnnotation {
            name: annotation.name.clone(),
            args: annotation.args.clone(),
        })
        .collect();
    Ok(property)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enums() -> BTreeSet<&'static str> {
        BTreeSet::from(["Role"])
    }

    #[test]
    fn resolves_through_dispatch_table() {
        let enums = enums();
        assert_eq!(
            parse_type_name("Double", &enums),
            Ok(TypeReference::primitive(Primitive::Double))
        );
        assert_eq!(
            parse_type_name("Role", &enums),
            Ok(TypeReference::enumeration("Role"))
        );
        assert_eq!(
            parse_type_name("com.acme.Address", &enums),
            Ok(TypeReference::record("com.acme.Address"))
        );
    }

    #[test]
    fn parses_nested_lists() {
        let parsed = parse_type_name(" List<List<Role>> ", &enums()).unwrap();
        assert_eq!(
            parsed,
            TypeReference::array(TypeReference::array(TypeReference::enumeration("Role")))
        );
    }

    #[test]
    fn rejects_malformed_names() {
        let enums = enums();
        assert_eq!(parse_type_name("  ", &enums), Err(TypeNameError::Empty));
        assert_eq!(parse_type_name("List<>", &enums), Err(TypeNameError::Empty));
        assert!(matches!(
            parse_type_name("List<String", &enums),
            Err(TypeNameError::Malformed(_))
        ));
        assert!(matches!(
            parse_type_name("Map<String,Int>", &enums),
            Err(TypeNameError::Malformed(_))
        ));
    }
}
