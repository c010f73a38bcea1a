use std::fmt;

use mongoschema_core::{
    DeclarationGraph, DeclarationProvider, RecordDeclaration, validate_declarations,
};
use serde::Serialize;

use crate::builder::SchemaBuilder;
use crate::errors::{CompileError, Result};
use crate::node::SchemaNode;
use crate::registry::ConstraintRegistry;

/// Finished schema of one schema-rooted record.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    /// Fully-qualified record name.
    pub record: String,
    pub simple_name: String,
    pub collection: String,
    pub node: SchemaNode,
}

/// All compiled schemas, in declaration order of their records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaForest {
    schemas: Vec<CompiledSchema>,
}

impl SchemaForest {
    pub fn iter(&self) -> std::slice::Iter<'_, CompiledSchema> {
        self.schemas.iter()
    }

    pub fn get(&self, collection: &str) -> Option<&CompiledSchema> {
        self.schemas
            .iter()
            .find(|schema| schema.collection == collection)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl<'a> IntoIterator for &'a SchemaForest {
    type Item = &'a CompiledSchema;
    type IntoIter = std::slice::Iter<'a, CompiledSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<CompiledSchema> for SchemaForest {
    fn from_iter<I: IntoIterator<Item = CompiledSchema>>(iter: I) -> Self {
        Self {
            schemas: iter.into_iter().collect(),
        }
    }
}

/// Why a schema-rooted record was handed back instead of built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DeferralReason {
    /// The provider reported the record as not fully resolved yet.
    Pending,
    /// A property names a declaration the graph does not contain.
    UnresolvedReference { field: String, type_name: String },
}

impl fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferralReason::Pending => f.write_str("pending in provider"),
            DeferralReason::UnresolvedReference { field, type_name } => {
                write!(f, "field {field} references unresolved {type_name}")
            }
        }
    }
}

/// Schema-rooted record deferred to a later pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredRecord {
    pub record: String,
    #[serde(flatten)]
    pub reason: DeferralReason,
}

/// Result of a compile run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub forest: SchemaForest,
    /// Recoverable channel: records to retry once their symbols resolve.
    pub deferred: Vec<DeferredRecord>,
    pub registry: ConstraintRegistry,
}

/// Compile every schema-rooted record of `graph`.
///
/// Validation and the registry pre-pass complete before the first build.
pub fn compile(graph: &DeclarationGraph) -> Result<GenerationOutcome> {
    validate_declarations(graph)?;

    let registry = ConstraintRegistry::collect(graph)?;
    let builder = SchemaBuilder::new(graph, &registry);

    let mut schemas = Vec::new();
    let mut deferred = Vec::new();

    for record in graph.schema_roots() {
        if let Some(reason) = deferral_reason(graph, record) {
            tracing::warn!(
                event = "record_deferred",
                record = %record.name,
                reason = %reason
            );
            deferred.push(DeferredRecord {
                record: record.name.clone(),
                reason,
            });
            continue;
        }

        let collection = record
            .schema_root
            .as_ref()
            .and_then(|root| root.collection_name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| CompileError::MissingRequiredMetadata {
                record: record.name.clone(),
            })?;

        let node = builder.build(record)?;
        tracing::debug!(
            event = "schema_built",
            record = %record.name,
            collection = %collection,
            fields = record.properties.len()
        );

        schemas.push(CompiledSchema {
            record: record.name.clone(),
            simple_name: record.simple_name().to_string(),
            collection: collection.to_string(),
            node,
        });
    }

    Ok(GenerationOutcome {
        forest: SchemaForest { schemas },
        deferred,
        registry,
    })
}

/// Materialize declarations from `provider`, then compile them.
pub fn compile_from<P: DeclarationProvider>(provider: &P) -> Result<GenerationOutcome> {
    let graph = provider
        .declarations()
        .map_err(|err| CompileError::Provider {
            provider: provider.source().to_string(),
            message: err.to_string(),
        })?;

    tracing::info!(
        event = "declarations_loaded",
        source = %provider.source(),
        records = graph.records().len(),
        enums = graph.enums().len()
    );

    compile(&graph)
}

/// A record is deferred when the provider marks it pending or one of its own
/// property types names a missing declaration. Nested records are not
/// inspected here.
fn deferral_reason(graph: &DeclarationGraph, record: &RecordDeclaration) -> Option<DeferralReason> {
    if graph.is_pending(&record.name) {
        return Some(DeferralReason::Pending);
    }

    record.properties.iter().find_map(|property| {
        let name = property.type_ref.referenced_declaration()?;
        (!graph.contains(name)).then(|| DeferralReason::UnresolvedReference {
            field: property.name.clone(),
            type_name: name.to_string(),
        })
    })
}
