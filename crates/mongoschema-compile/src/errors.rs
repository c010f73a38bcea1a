use thiserror::Error;

use crate::registry::ConstraintKey;

/// Fatal errors that abort a compile run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Declarations(#[from] mongoschema_core::Error),
    #[error("declaration provider {provider} failed: {message}")]
    Provider { provider: String, message: String },
    #[error("missing required metadata: schema-rooted record {record} has no collection name")]
    MissingRequiredMetadata { record: String },
    #[error("annotation inconsistency at {key}: {annotation} {reason}")]
    AnnotationInconsistency {
        key: ConstraintKey,
        annotation: String,
        reason: String,
    },
    #[error("unresolved type at {key}: {type_name}")]
    UnresolvedType { key: ConstraintKey, type_name: String },
    #[error("cyclic record nesting at {key}: {}", .path.join(" -> "))]
    CyclicNesting { key: ConstraintKey, path: Vec<String> },
}

/// Result type for compile operations.
pub type Result<T> = std::result::Result<T, CompileError>;
