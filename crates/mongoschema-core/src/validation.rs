use std::collections::BTreeSet;

use crate::declarations::DeclarationGraph;
use crate::error::{Error, Result};

/// Validate internal consistency of a declaration graph.
///
/// This checks:
/// - duplicate record and enum names, and names shared between the two
/// - duplicate property names within a record
/// - enums without values, and repeated enum values
pub fn validate_declarations(graph: &DeclarationGraph) -> Result<()> {
    let mut records = BTreeSet::new();
    for record in graph.records() {
        if !records.insert(record.name.as_str()) {
            return Err(Error::InvalidDeclaration(format!(
                "duplicate record name: {}",
                record.name
            )));
        }

        let mut properties = BTreeSet::new();
        for property in &record.properties {
            if !properties.insert(property.name.as_str()) {
                return Err(Error::InvalidDeclaration(format!(
                    "duplicate property name: {}#{}",
                    record.name, property.name
                )));
            }
        }
    }

    let mut enums = BTreeSet::new();
    for decl in graph.enums() {
        if !enums.insert(decl.name.as_str()) {
            return Err(Error::InvalidDeclaration(format!(
                "duplicate enum name: {}",
                decl.name
            )));
        }
        if records.contains(decl.name.as_str()) {
            return Err(Error::InvalidDeclaration(format!(
                "name declared as both record and enum: {}",
                decl.name
            )));
        }
        if decl.values.is_empty() {
            return Err(Error::InvalidDeclaration(format!(
                "enum has no values: {}",
                decl.name
            )));
        }

        let mut values = BTreeSet::new();
        for value in &decl.values {
            if !values.insert(value.as_str()) {
                return Err(Error::InvalidDeclaration(format!(
                    "duplicate enum value: {}.{}",
                    decl.name, value
                )));
            }
        }
    }

    Ok(())
}
