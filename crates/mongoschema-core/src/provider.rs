use std::convert::Infallible;

use crate::declarations::DeclarationGraph;

/// Capability implemented by discovery mechanisms that can hand the
/// compiler a normalized declaration graph.
pub trait DeclarationProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short identifier of where declarations come from (e.g. a file path).
    fn source(&self) -> &str;

    /// Materialize the full declaration graph.
    fn declarations(&self) -> std::result::Result<DeclarationGraph, Self::Error>;
}

impl DeclarationProvider for DeclarationGraph {
    type Error = Infallible;

    fn source(&self) -> &str {
        "in-memory"
    }

    fn declarations(&self) -> std::result::Result<DeclarationGraph, Self::Error> {
        Ok(self.clone())
    }
}
