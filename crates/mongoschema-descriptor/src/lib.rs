//! Descriptor-file declaration provider.
//!
//! Reads a JSON or TOML descriptor listing records and enums, checks it
//! against the descriptor JSON Schema, and maps it into a
//! [`mongoschema_core::DeclarationGraph`].

pub mod errors;
pub mod mapper;
pub mod model;
pub mod provider;
pub mod schema;
pub mod validate;

pub use errors::{DescriptorError, IssueSeverity, Result, ValidationIssue, ValidationReport};
pub use mapper::{TypeNameError, build_graph, parse_type_name};
pub use model::{
    AnnotationEntry, Descriptor, EnumEntry, PropertyEntry, RecordEntry, SchemaRootEntry,
};
pub use provider::{DescriptorFormat, DescriptorProvider, parse_descriptor_value};
pub use schema::descriptor_json_schema;
pub use validate::{ValidatedDescriptor, validate_descriptor, validate_descriptor_json};
