//! Serializers for compiled schemas.
//!
//! Produces one `{"$jsonSchema": ...}` document per schema-rooted record and
//! an aggregate Rust module mapping collection names to the same text.

pub mod aggregate;
pub mod document;
pub mod emitter;
pub mod errors;
pub mod output;

pub use aggregate::AggregateArtifact;
pub use document::{SchemaDocument, document_file_name, parse_document, render_document};
pub use emitter::{EmitOptions, EmittedArtifacts, emit};
pub use errors::{EmitError, Result};
pub use output::{OutputLayout, WrittenArtifacts, write_artifacts, write_bytes_atomic};
