//! Database access for the store (`SQLite`).
//!
//! ## Tables
//!
//! - `users` - Customers and back-office admins (Argon2id password hashes)
//! - `products` - Catalog entries
//! - `credentials` - Resold account credentials (stock)
//! - `orders` - Customer orders; holds a snapshot of the delivered credential
//! - `feedback` - Customer feedback with screenshot
//! - `tower_sessions` - Session storage, created by the session store itself
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded into
//! the binary. Run them with:
//! ```bash
//! ax-cli migrate
//! ```

pub mod credentials;
pub mod feedback;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use credentials::CredentialRepository;
pub use feedback::FeedbackRepository;
pub use orders::{DeliveryOutcome, OrderRepository};
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `SQLite` connection pool.
///
/// Foreign keys are enforced and the database file is created if missing.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
) -> Result<SqlitePool, sqlx::Error> {
    let options = database_url
        .expose_secret()
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history does
/// not match the embedded migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Parse a stored enum column, reporting bad values as corruption.
pub(crate) fn parse_column<T>(value: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(RepositoryError::DataCorruption)
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory database for tests.

    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    use aiaxcart_core::{
        AccountType, CredentialId, CredentialSecret, Email, ProductId, ProductStatus, UserId,
        UserRole,
    };

    use super::{CredentialRepository, ProductRepository, UserRepository};
    use crate::models::{NewProduct, Product};

    /// A fresh, migrated in-memory database.
    ///
    /// One connection only: every connection to `sqlite::memory:` is its own
    /// database.
    #[allow(clippy::unwrap_used)]
    pub async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        super::run_migrations(&pool).await.unwrap();
        pool
    }

    #[allow(clippy::unwrap_used)]
    pub async fn product(pool: &SqlitePool, name: &str, price: i64) -> Product {
        ProductRepository::new(pool)
            .create(&NewProduct {
                name: name.to_owned(),
                category: "streaming".to_owned(),
                price,
                description: format!("{name} subscription"),
                image: None,
                status: ProductStatus::Active,
            })
            .await
            .unwrap()
    }

    #[allow(clippy::unwrap_used)]
    pub async fn credential(
        pool: &SqlitePool,
        product_id: ProductId,
        account_type: AccountType,
        login: &str,
    ) -> CredentialId {
        CredentialRepository::new(pool)
            .create(
                product_id,
                account_type,
                &CredentialSecret {
                    login: login.to_owned(),
                    password: "pa55word!".to_owned(),
                    profile: None,
                    pin: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    #[allow(clippy::unwrap_used)]
    pub async fn user(pool: &SqlitePool, name: &str, email: &str, role: UserRole) -> UserId {
        UserRepository::new(pool)
            .create(name, &Email::parse(email).unwrap(), "$argon2id$stub", role)
            .await
            .unwrap()
            .id
    }
}
