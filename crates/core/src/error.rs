use crate::types::DbId;

/// Domain error taxonomy shared by the db and api layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The actor may not act for any required role on this step.
    #[error("Ineligible: {0}")]
    Ineligible(String),

    /// The scheduler template is malformed (zero or multiple production steps).
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// A referenced binding target (person, pool) does not exist, or a
    /// uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A multi-row persistence operation failed after partial writes were
    /// attempted. Callers should retry the whole operation, not patch it.
    #[error("Partial failure: {0}")]
    PartialFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
