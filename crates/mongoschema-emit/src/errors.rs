use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("collection {collection} is claimed by both {first} and {second}")]
    DuplicateCollection {
        collection: String,
        first: String,
        second: String,
    },
    #[error("document {file_name} would be written by both {first} and {second}")]
    DuplicateDocument {
        file_name: String,
        first: String,
        second: String,
    },
    #[error("invalid output path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, EmitError>;
