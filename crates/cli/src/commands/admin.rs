//! Admin user management.
//!
//! # Usage
//!
//! ```bash
//! ax-cli admin create -e admin@example.com -n "Admin Name" -p 'long passphrase'
//! ```

use secrecy::SecretString;
use thiserror::Error;

use aiaxcart_storefront::db;
use aiaxcart_storefront::services::{AuthError, AuthService};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Admin user already exists with email: {0}")]
    UserExists(String),

    #[error(transparent)]
    Auth(AuthError),
}

/// Create a back-office admin.
///
/// # Errors
///
/// Returns `AdminError::UserExists` if the email is taken, or
/// `AdminError::Auth` if the name, email or password is rejected.
pub async fn create_user(
    database_url: &SecretString,
    email: &str,
    name: &str,
    password: &str,
) -> Result<i64, AdminError> {
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;

    tracing::info!("Creating admin user: {email}");
    let user = AuthService::new(&pool)
        .create_admin(name, email, password)
        .await
        .map_err(|e| match e {
            AuthError::UserAlreadyExists => AdminError::UserExists(email.to_owned()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id.as_i64())
}
