//! Export every collection as a JSON array, one file per collection.
//!
//! Files are named after the collection keys (`aiaxcart_users.json`,
//! `aiaxcart_products.json`, ...). Orders keep their stored status and users
//! are written without password hashes.

use std::path::Path;

use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;

use aiaxcart_storefront::db::{
    self, CredentialRepository, FeedbackRepository, OrderRepository, UserRepository,
};
use aiaxcart_storefront::services::CatalogService;

/// Collection keys, in export order.
pub const COLLECTIONS: [&str; 5] = [
    "aiaxcart_users",
    "aiaxcart_products",
    "aiaxcart_accounts",
    "aiaxcart_orders",
    "aiaxcart_feedback",
];

/// Export to `dir`.
///
/// # Errors
///
/// Returns an error if the database can't be read or a file can't be written.
pub async fn run(
    database_url: &SecretString,
    dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(database_url).await?;
    let written = write_all(&pool, dir).await?;
    tracing::info!(files = written, dir = %dir.display(), "Export complete!");
    Ok(())
}

/// Write one JSON file per collection and return how many were written.
///
/// # Errors
///
/// Returns an error if a query or a write fails.
pub async fn write_all(pool: &SqlitePool, dir: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(dir).await?;

    let collections = collect(pool).await?;
    for (key, records) in &collections {
        let path = dir.join(format!("{key}.json"));
        let count = records.as_array().map_or(0, Vec::len);
        tokio::fs::write(&path, serde_json::to_vec_pretty(records)?).await?;
        tracing::info!(collection = key, records = count, path = %path.display(), "Wrote collection");
    }
    Ok(collections.len())
}

/// Every collection as `(key, JSON array)`.
async fn collect(pool: &SqlitePool) -> Result<Vec<(&'static str, Value)>, Box<dyn std::error::Error>> {
    let [users, products, accounts, orders, feedback] = COLLECTIONS;
    Ok(vec![
        (
            users,
            serde_json::to_value(UserRepository::new(pool).list().await?)?,
        ),
        (
            products,
            serde_json::to_value(CatalogService::new(pool).all_products().await?)?,
        ),
        (
            accounts,
            serde_json::to_value(CredentialRepository::new(pool).list().await?)?,
        ),
        (
            orders,
            serde_json::to_value(OrderRepository::new(pool).list().await?)?,
        ),
        (
            feedback,
            serde_json::to_value(FeedbackRepository::new(pool).list().await?)?,
        ),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aiaxcart_core::{Email, UserRole};

    use super::*;
    use crate::commands::testing;

    #[tokio::test]
    async fn test_writes_one_file_per_collection() {
        let pool = testing::pool().await;
        UserRepository::new(&pool)
            .create(
                "Ana",
                &Email::parse("ana@shop.ph").unwrap(),
                "$argon2id$v=19$stub",
                UserRole::User,
            )
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();

        let written = write_all(&pool, dir.path()).await.unwrap();
        assert_eq!(written, COLLECTIONS.len());

        for key in COLLECTIONS {
            let bytes = std::fs::read(dir.path().join(format!("{key}.json"))).unwrap();
            let json: Value = serde_json::from_slice(&bytes).unwrap();
            assert!(json.is_array(), "{key}");
        }

        let users: Value = serde_json::from_slice(
            &std::fs::read(dir.path().join("aiaxcart_users.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(users[0]["email"], "ana@shop.ph");
        assert!(users[0].get("password_hash").is_none());
    }
}
