//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded in the
//! storefront library, so the CLI and the server always agree on the schema.

use secrecy::SecretString;

use aiaxcart_storefront::db;

/// Apply every pending migration.
///
/// # Errors
///
/// Returns an error if the database can't be opened or a migration fails.
pub async fn run(database_url: &SecretString) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
