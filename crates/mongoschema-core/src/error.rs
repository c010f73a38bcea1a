use thiserror::Error;

/// Core error type shared across mongoschema crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The declaration graph violates internal invariants.
    #[error("invalid declarations: {0}")]
    InvalidDeclaration(String),
}

/// Convenience alias for results returned by mongoschema crates.
pub type Result<T> = std::result::Result<T, Error>;
