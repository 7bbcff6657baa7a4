use airsoft_database::DatabaseError;
use thiserror::Error;

/// Terminal rejection produced by the authorization middleware.
///
/// Messages are safe to show to users; store internals are logged, never
/// carried here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The club store could not be queried
    #[error("Internal error")]
    Internal,
}

impl Rejection {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::Unauthenticated => "unauthenticated",
            Rejection::InvalidInput(_) => "invalid_input",
            Rejection::NotFound(_) => "not_found",
            Rejection::Forbidden(_) => "forbidden",
            Rejection::Internal => "internal_error",
        }
    }
}

impl From<validator::ValidationErrors> for Rejection {
    fn from(err: validator::ValidationErrors) -> Self {
        Rejection::InvalidInput(err.to_string())
    }
}

/// Outcome of a failed action: either the middleware rejected it before the
/// handler ran, or the handler itself failed.
#[derive(Debug, Error)]
pub enum ActionError<E> {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Handler(E),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;

/// Errors raised by the club, membership, event and profile handlers.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "not_found",
            DomainError::Conflict(_) => "conflict",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::Validation(_) => "validation_error",
            DomainError::Database(_) | DomainError::Serialization(_) => "internal_error",
        }
    }
}

impl From<DatabaseError> for DomainError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => DomainError::NotFound(what),
            DatabaseError::DuplicateEntry(what) => DomainError::Conflict(what),
            other => DomainError::Database(other),
        }
    }
}
