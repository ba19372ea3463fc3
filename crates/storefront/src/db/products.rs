//! Product repository.
//!
//! Stock is never stored: every read counts the product's available
//! credentials.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use aiaxcart_core::ProductId;

use super::{RepositoryError, parse_column};
use crate::models::{NewProduct, Product};

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.category, p.price, p.description, p.image, p.status, p.created_at,
           (SELECT COUNT(*) FROM credentials c
             WHERE c.product_id = p.id AND c.status = 'available') AS stock
    FROM products p
";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    category: String,
    price: i64,
    description: String,
    image: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    stock: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            category: row.category,
            price: row.price,
            description: row.description,
            image: row.image,
            status: parse_column(&row.status)?,
            stock: row.stock,
            created_at: row.created_at,
        })
    }
}

/// Optional filters for [`ProductRepository::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter<'f> {
    /// Only products in this category.
    pub category: Option<&'f str>,
    /// Only active products.
    pub active_only: bool,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List products with stock, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: ProductFilter<'_>) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r"{PRODUCT_SELECT}
            WHERE (?1 IS NULL OR p.category = ?1)
              AND (?2 = 0 OR p.status = 'active')
            ORDER BY p.id"
        ))
        .bind(filter.category)
        .bind(filter.active_only)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product with stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("{PRODUCT_SELECT} WHERE p.id = ?"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO products (name, category, price, description, image, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.image.as_deref())
        .bind(product.status.as_str())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        self.get(ProductId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = ?, category = ?, price = ?, description = ?, image = ?, status = ?
            WHERE id = ?
            ",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.image.as_deref())
        .bind(product.status.as_str())
        .bind(id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product that no credential references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any credential references the product.
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let referenced: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM credentials WHERE product_id = ?")
                .bind(id.as_i64())
                .fetch_one(&mut *tx)
                .await?;
        if referenced > 0 {
            return Err(RepositoryError::Conflict(format!(
                "product {id} has {referenced} credential(s)"
            )));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
