//! Error types for the blog domain and its persistence ports.

use thiserror::Error;
use uuid::Uuid;

/// Business rule violations raised by the domain and the handlers.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required field is missing or blank.
    #[error("{0}")]
    Validation(String),

    /// A unique value (e.g. a username) is already in use.
    #[error("{0}")]
    Duplicate(String),

    /// The caller tried to modify a record they did not author.
    #[error("User is not the author of {entity_type} {id}")]
    NotAuthor { entity_type: &'static str, id: Uuid },
}

/// Failures reported by repository adapters.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("{0}")]
    Query(String),

    /// The targeted row does not exist (update/delete).
    #[error("Record not found")]
    NotFound,

    /// A unique or integrity constraint rejected the write.
    #[error("{0}")]
    Constraint(String),
}
