use std::collections::BTreeMap;

use mongoschema_compile::SchemaForest;

use crate::aggregate::AggregateArtifact;
use crate::document::{SchemaDocument, document_file_name, render_document};
use crate::errors::{EmitError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Appended to the simple record name to form the document file name.
    pub document_suffix: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            document_suffix: "Schema".to_string(),
        }
    }
}

/// In-memory artifacts of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmittedArtifacts {
    pub documents: Vec<SchemaDocument>,
    /// `None` when no schema was produced.
    pub aggregate: Option<AggregateArtifact>,
}

/// Render every compiled schema of `forest`.
///
/// Collection names and document file names must be unique across the
/// forest.
pub fn emit(forest: &SchemaForest, options: &EmitOptions) -> Result<EmittedArtifacts> {
    let mut collections: BTreeMap<&str, &str> = BTreeMap::new();
    let mut file_names: BTreeMap<String, &str> = BTreeMap::new();
    let mut documents = Vec::with_capacity(forest.len());

    for schema in forest {
        if let Some(first) = collections.insert(&schema.collection, &schema.record) {
            return Err(EmitError::DuplicateCollection {
                collection: schema.collection.clone(),
                first: first.to_string(),
                second: schema.record.clone(),
            });
        }

        let file_name = document_file_name(&schema.simple_name, &options.document_suffix);
        if let Some(first) = file_names.insert(file_name.clone(), &schema.record) {
            return Err(EmitError::DuplicateDocument {
                file_name,
                first: first.to_string(),
                second: schema.record.clone(),
            });
        }

        let text = render_document(&schema.node)?;
        tracing::debug!(
            event = "document_rendered",
            collection = %schema.collection,
            file = %file_name,
            bytes = text.len()
        );

        documents.push(SchemaDocument {
            record: schema.record.clone(),
            collection: schema.collection.clone(),
            file_name,
            text,
        });
    }

    let aggregate = (!documents.is_empty()).then(|| AggregateArtifact::from_documents(&documents));

    Ok(EmittedArtifacts {
        documents,
        aggregate,
    })
}
