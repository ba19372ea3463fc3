//! Credential stock repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use aiaxcart_core::{
    AccountType, CredentialId, CredentialSecret, CredentialStatus, ProductId,
};

use super::{RepositoryError, parse_column};
use crate::models::{Credential, CredentialListing};

const CREDENTIAL_COLUMNS: &str =
    "c.id, c.product_id, c.account_type, c.login, c.password, c.profile, c.pin, c.status, c.created_at";

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: i64,
    product_id: i64,
    account_type: String,
    login: String,
    password: String,
    profile: Option<String>,
    pin: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = RepositoryError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CredentialId::new(row.id),
            product_id: ProductId::new(row.product_id),
            account_type: parse_column(&row.account_type)?,
            secret: CredentialSecret {
                login: row.login,
                password: row.password,
                profile: row.profile,
                pin: row.pin,
            },
            status: parse_column(&row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialListingRow {
    #[sqlx(flatten)]
    credential: CredentialRow,
    product_name: String,
}

/// Repository for credential stock.
pub struct CredentialRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CredentialRepository<'a> {
    /// Create a new credential repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add an available credential for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including an
    /// unknown product, rejected by the foreign key).
    pub async fn create(
        &self,
        product_id: ProductId,
        account_type: AccountType,
        secret: &CredentialSecret,
    ) -> Result<Credential, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO credentials
                (product_id, account_type, login, password, profile, pin, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 'available', ?)
            RETURNING id
            ",
        )
        .bind(product_id.as_i64())
        .bind(account_type.as_str())
        .bind(&secret.login)
        .bind(&secret.password)
        .bind(secret.profile.as_deref())
        .bind(secret.pin.as_deref())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        self.get(CredentialId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get a credential by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CredentialId) -> Result<Option<Credential>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM credentials c WHERE c.id = ?"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(Credential::try_from).transpose()
    }

    /// List every credential with its product name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CredentialListing>, RepositoryError> {
        let rows: Vec<CredentialListingRow> = sqlx::query_as(&format!(
            r"
            SELECT {CREDENTIAL_COLUMNS}, COALESCE(p.name, 'Unknown') AS product_name
            FROM credentials c
            LEFT JOIN products p ON p.id = c.product_id
            ORDER BY c.id
            "
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(CredentialListing {
                    credential: Credential::try_from(r.credential)?,
                    product_name: r.product_name,
                })
            })
            .collect()
    }

    /// Replace the secret fields of an available credential.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the credential doesn't exist.
    /// Returns `RepositoryError::Conflict` if it has already been sold.
    pub async fn update_secret(
        &self,
        id: CredentialId,
        secret: &CredentialSecret,
    ) -> Result<Credential, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE credentials
            SET login = ?, password = ?, profile = ?, pin = ?
            WHERE id = ? AND status = 'available'
            ",
        )
        .bind(&secret.login)
        .bind(&secret.password)
        .bind(secret.profile.as_deref())
        .bind(secret.pin.as_deref())
        .bind(id.as_i64())
        .execute(self.pool)
        .await?;

        let credential = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!("credential {id} is sold")));
        }
        Ok(credential)
    }

    /// Count available credentials for one product and account type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_available(
        &self,
        product_id: ProductId,
        account_type: AccountType,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM credentials
            WHERE product_id = ? AND account_type = ? AND status = 'available'
            ",
        )
        .bind(product_id.as_i64())
        .bind(account_type.as_str())
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Count credentials in a status across all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_status(&self, status: CredentialStatus) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credentials WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::testing;

    fn secret(login: &str) -> CredentialSecret {
        CredentialSecret {
            login: login.to_owned(),
            password: "n3tfl1x".to_owned(),
            profile: Some("Profile 2".to_owned()),
            pin: Some("1234".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_create_starts_available() {
        let pool = testing::pool().await;
        let product = testing::product(&pool, "Netflix Premium", 299).await;
        let repo = CredentialRepository::new(&pool);

        let credential = repo
            .create(product.id, AccountType::Solo, &secret("solo@n.tv"))
            .await
            .unwrap();
        assert_eq!(credential.status, CredentialStatus::Available);
        assert_eq!(credential.secret.pin.as_deref(), Some("1234"));

        assert_eq!(
            repo.count_available(product.id, AccountType::Solo)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            repo.count_available(product.id, AccountType::Shared)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_create_for_unknown_product_fails() {
        let pool = testing::pool().await;
        let repo = CredentialRepository::new(&pool);
        assert!(
            repo.create(ProductId::new(99), AccountType::Shared, &secret("x@y.z"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_list_includes_product_name() {
        let pool = testing::pool().await;
        let product = testing::product(&pool, "Spotify Premium", 199).await;
        testing::credential(&pool, product.id, AccountType::Shared, "fam@spotify").await;

        let listing = CredentialRepository::new(&pool).list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].product_name, "Spotify Premium");
    }

    #[tokio::test]
    async fn test_update_secret_only_while_available() {
        let pool = testing::pool().await;
        let product = testing::product(&pool, "Netflix Premium", 299).await;
        let id = testing::credential(&pool, product.id, AccountType::Shared, "old@n.tv").await;
        let repo = CredentialRepository::new(&pool);

        let updated = repo.update_secret(id, &secret("new@n.tv")).await.unwrap();
        assert_eq!(updated.secret.login, "new@n.tv");

        sqlx::query("UPDATE credentials SET status = 'sold' WHERE id = ?")
            .bind(id.as_i64())
            .execute(&pool)
            .await
            .unwrap();

        let err = repo
            .update_secret(id, &secret("other@n.tv"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let err = repo
            .update_secret(CredentialId::new(404), &secret("x@n.tv"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
