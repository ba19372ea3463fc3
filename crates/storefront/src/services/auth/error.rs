//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] aiaxcart_core::EmailError),

    /// Wrong password or unknown email. Deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Email already registered.
    #[error("User with this email already exists")]
    UserAlreadyExists,

    /// Name missing.
    #[error("Name is required")]
    MissingName,

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
