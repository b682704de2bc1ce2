use thiserror::Error;

/// Failure taxonomy shared by every operation in the crate.
///
/// Every variant except [`DomainError::Unexpected`] is recoverable at the
/// caller and maps to a distinct user-facing outcome. `Unexpected` covers
/// storage connectivity and other conditions that are fatal to the request.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("username is already taken")]
    DuplicateUsername,

    #[error("email is already in use")]
    DuplicateEmail,

    #[error("forbidden")]
    Forbidden,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unsupported image format: '{0}'")]
    UnsupportedFormat(String),

    #[error("unreadable image: {0}")]
    UnreadableImage(String),

    #[error("failed to write image file: {0}")]
    StorageWrite(#[source] std::io::Error),

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
