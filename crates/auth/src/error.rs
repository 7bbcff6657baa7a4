use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] airsoft_database::DatabaseError),

    #[error("Session provider error: {0}")]
    Provider(String),
}
