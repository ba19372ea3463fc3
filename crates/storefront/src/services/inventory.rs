//! Credential stock management for the back office.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use aiaxcart_core::{AccountType, CredentialId, CredentialSecret, ProductId};

use crate::db::{CredentialRepository, ProductRepository, RepositoryError};
use crate::models::{Credential, CredentialListing};

/// Errors from stock operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Account not found")]
    CredentialNotFound,

    /// Sold credentials belong to an order and are frozen.
    #[error("Sold accounts cannot be edited")]
    CredentialSold,

    #[error("Email/login and password are required")]
    IncompleteSecret,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Stock operations.
pub struct InventoryService<'a> {
    credentials: CredentialRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> InventoryService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            credentials: CredentialRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Add an available credential to a product's stock.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::ProductNotFound` if the product doesn't exist.
    /// Returns `InventoryError::IncompleteSecret` if login or password is blank.
    #[instrument(skip(self, secret))]
    pub async fn add(
        &self,
        product_id: ProductId,
        account_type: AccountType,
        secret: CredentialSecret,
    ) -> Result<Credential, InventoryError> {
        let secret = clean(secret)?;
        if self.products.get(product_id).await?.is_none() {
            return Err(InventoryError::ProductNotFound);
        }

        let credential = self
            .credentials
            .create(product_id, account_type, &secret)
            .await?;
        tracing::info!(credential_id = %credential.id, "Account added to stock");
        Ok(credential)
    }

    /// Every credential with its product name.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<CredentialListing>, InventoryError> {
        Ok(self.credentials.list().await?)
    }

    /// Replace the login details of an unsold credential.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::CredentialNotFound` if it doesn't exist.
    /// Returns `InventoryError::CredentialSold` if it has been sold.
    #[instrument(skip(self, secret))]
    pub async fn update(
        &self,
        id: CredentialId,
        secret: CredentialSecret,
    ) -> Result<Credential, InventoryError> {
        let secret = clean(secret)?;
        self.credentials
            .update_secret(id, &secret)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => InventoryError::CredentialNotFound,
                RepositoryError::Conflict(_) => InventoryError::CredentialSold,
                other => other.into(),
            })
    }

    /// Available credentials for a product and account type.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Repository` if the query fails.
    pub async fn available(
        &self,
        product_id: ProductId,
        account_type: AccountType,
    ) -> Result<i64, InventoryError> {
        Ok(self
            .credentials
            .count_available(product_id, account_type)
            .await?)
    }
}

/// Trim the secret fields and drop empty optionals.
fn clean(secret: CredentialSecret) -> Result<CredentialSecret, InventoryError> {
    let optional = |v: Option<String>| v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());
    let secret = CredentialSecret {
        login: secret.login.trim().to_owned(),
        password: secret.password,
        profile: optional(secret.profile),
        pin: optional(secret.pin),
    };
    if !secret.is_complete() {
        return Err(InventoryError::IncompleteSecret);
    }
    Ok(secret)
}
