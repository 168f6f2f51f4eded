//! Cross-cutting error types for Colmeia.
//!
//! Storage and transport errors (`DatabaseError`, `WebError`) live in their
//! own crates and wrap these where a domain rule is involved.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can be raised by any Colmeia crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A record failed one or more field rules.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
