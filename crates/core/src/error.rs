/// Domain-level errors shared across the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A record does not exist. `id` is a loggable identifier (row id or
    /// token prefix), never a full token.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input failed a syntactic check before reaching the store.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller is not allowed to perform the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
