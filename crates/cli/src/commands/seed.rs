//! Seed the catalog and credential stock from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Netflix Premium
//!     category: streaming
//!     price: 299
//!     description: Full access to Netflix Premium with 4K streaming
//!     image: "📺"
//!     stock:
//!       - account_type: shared
//!         login: family@example.com
//!         password: hunter22
//! ```
//!
//! Products whose name already exists are skipped along with their stock, so
//! the same file can be applied twice.

use std::collections::HashSet;
use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use aiaxcart_core::{AccountType, CredentialSecret};
use aiaxcart_storefront::db;
use aiaxcart_storefront::models::NewProduct;
use aiaxcart_storefront::services::{CatalogService, InventoryService};

/// Top level of a catalog seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    pub products: Vec<SeedProduct>,
}

/// One product and the credentials to stock it with.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    #[serde(flatten)]
    pub product: NewProduct,
    #[serde(default)]
    pub stock: Vec<SeedCredential>,
}

/// One credential to stock.
#[derive(Debug, Deserialize)]
pub struct SeedCredential {
    pub account_type: AccountType,
    #[serde(flatten)]
    pub secret: CredentialSecret,
}

/// What a seed run changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products_created: usize,
    pub products_skipped: usize,
    pub credentials_added: usize,
}

/// Seed from a YAML file.
///
/// # Errors
///
/// Returns an error if the file can't be read or parsed, or a product or
/// credential is rejected.
pub async fn catalog(
    database_url: &SecretString,
    file_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file_path.exists() {
        return Err(format!("File not found: {}", file_path.display()).into());
    }

    info!(path = %file_path.display(), "Loading catalog seed");
    let content = tokio::fs::read_to_string(file_path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;
    info!(products = seed.products.len(), "Parsed seed file");

    let pool = db::create_pool(database_url).await?;
    let summary = apply(&pool, seed).await?;

    info!("Seeding complete!");
    info!("  Products created: {}", summary.products_created);
    info!("  Products skipped (already exist): {}", summary.products_skipped);
    info!("  Accounts added: {}", summary.credentials_added);
    Ok(())
}

/// Insert every product not already in the catalog, with its stock.
///
/// # Errors
///
/// Returns the first catalog or inventory error.
pub async fn apply(
    pool: &SqlitePool,
    seed: CatalogSeed,
) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let catalog = CatalogService::new(pool);
    let inventory = InventoryService::new(pool);

    let mut existing: HashSet<String> = catalog
        .all_products()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut summary = SeedSummary::default();
    for entry in seed.products {
        let name = entry.product.name.trim().to_owned();
        if !existing.insert(name.clone()) {
            warn!(product = %name, "Product exists, skipping");
            summary.products_skipped += 1;
            continue;
        }

        let product = catalog.create_product(entry.product).await?;
        summary.products_created += 1;

        for credential in entry.stock {
            inventory
                .add(product.id, credential.account_type, credential.secret)
                .await?;
            summary.credentials_added += 1;
        }
    }
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::testing;

    const SEED: &str = r#"
products:
  - name: Netflix Premium
    category: Streaming
    price: 299
    image: "📺"
    stock:
      - account_type: shared
        login: family@n.tv
        password: pw-1
      - account_type: solo
        login: solo@n.tv
        password: pw-2
        profile: Kids
        pin: "0420"
  - name: Spotify Premium
    category: streaming
    price: 199
"#;

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let pool = testing::pool().await;

        let first = apply(&pool, serde_yaml::from_str(SEED).unwrap())
            .await
            .unwrap();
        assert_eq!(
            first,
            SeedSummary {
                products_created: 2,
                products_skipped: 0,
                credentials_added: 2,
            }
        );

        let second = apply(&pool, serde_yaml::from_str(SEED).unwrap())
            .await
            .unwrap();
        assert_eq!(second.products_created, 0);
        assert_eq!(second.products_skipped, 2);

        let products = CatalogService::new(&pool).all_products().await.unwrap();
        let netflix = products.iter().find(|p| p.name == "Netflix Premium").unwrap();
        assert_eq!(netflix.category, "streaming");
        assert_eq!(netflix.stock, 2);
    }

    #[test]
    fn test_bundled_seed_parses() {
        let seed: CatalogSeed =
            serde_yaml::from_str(include_str!("../../seed/catalog.yaml")).unwrap();
        assert!(seed.products.iter().any(|p| p.product.name == "Netflix Premium"));
    }
}
