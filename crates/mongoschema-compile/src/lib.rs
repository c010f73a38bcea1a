//! Schema compiler for mongoschema.
//!
//! Turns a declaration graph into `$jsonSchema` validator nodes in two
//! phases: a constraint registry pre-pass over every annotated field, then a
//! side-effect-free recursive build per schema-rooted record.

pub mod builder;
pub mod classify;
pub mod defaults;
pub mod errors;
pub mod node;
pub mod pipeline;
pub mod registry;

pub use builder::SchemaBuilder;
pub use classify::classify;
pub use defaults::{EMAIL_PATTERN, MIN_TWO_LETTERS_PATTERN, default_fragment};
pub use errors::{CompileError, Result};
pub use node::{BsonType, Properties, SchemaNode};
pub use pipeline::{
    CompiledSchema, DeferralReason, DeferredRecord, GenerationOutcome, SchemaForest, compile,
    compile_from,
};
pub use registry::{ConstraintFragment, ConstraintKey, ConstraintRegistry};
