//! Core contracts for mongoschema.
//!
//! This crate defines the declaration graph that discovery providers hand to
//! the compiler, the annotation vocabulary, and validation helpers shared by
//! the compiler and the CLI.

pub mod annotations;
pub mod declarations;
pub mod error;
pub mod graph;
pub mod provider;
pub mod types;
pub mod validation;

pub use annotations::{AnnotationKind, ConstraintAnnotation, ExtractError, RawAnnotation};
pub use declarations::{
    DeclarationGraph, EnumDeclaration, PropertyDeclaration, RecordDeclaration, SchemaRoot,
};
pub use error::{Error, Result};
pub use graph::{NestingGraphReport, NestingGraphSummary, build_nesting_graph_report};
pub use provider::DeclarationProvider;
pub use types::{Primitive, TypeReference, TypeTag};
pub use validation::validate_declarations;
