//! Catalog service: browsing, quoting and product administration.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use aiaxcart_core::ProductId;
use aiaxcart_core::PurchaseOptions;
use aiaxcart_core::pricing::Quote;

use crate::db::products::ProductFilter;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::{NewProduct, Product};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found")]
    ProductNotFound,

    /// Credentials still reference the product.
    #[error("Product has accounts in stock and cannot be deleted")]
    ProductInUse,

    #[error("{0}")]
    Invalid(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Catalog operations.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Products shown in the storefront, optionally limited to one category.
    ///
    /// `None`, an empty string and `all` all mean every category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn storefront_products(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Product>, CatalogError> {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_lowercase);

        Ok(self
            .products
            .list(ProductFilter {
                category: category.as_deref(),
                active_only: true,
            })
            .await?)
    }

    /// Every product, active or not, for the back office.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn all_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list(ProductFilter::default()).await?)
    }

    /// One product with stock.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if it doesn't exist.
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .get(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }

    /// Price a selection without ordering it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product doesn't exist.
    pub async fn quote(
        &self,
        id: ProductId,
        options: &PurchaseOptions,
    ) -> Result<Quote, CatalogError> {
        let product = self.product(id).await?;
        Ok(Quote::new(product.price, options))
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if a field is missing or out of range.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, CatalogError> {
        let input = normalize(input)?;
        let product = self.products.create(&input).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if it doesn't exist.
    /// Returns `CatalogError::Invalid` if a field is missing or out of range.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: NewProduct,
    ) -> Result<Product, CatalogError> {
        let input = normalize(input)?;
        self.products.update(id, &input).await.map_err(|e| match e {
            RepositoryError::NotFound => CatalogError::ProductNotFound,
            other => other.into(),
        })
    }

    /// Delete a product nothing in stock refers to.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductInUse` if any credential references it.
    /// Returns `CatalogError::ProductNotFound` if it doesn't exist.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        self.products.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => CatalogError::ProductNotFound,
            RepositoryError::Conflict(_) => CatalogError::ProductInUse,
            other => other.into(),
        })?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

/// Trim text fields, lower-case the category and check required fields.
fn normalize(mut input: NewProduct) -> Result<NewProduct, CatalogError> {
    input.name = input.name.trim().to_owned();
    input.category = input.category.trim().to_lowercase();
    input.description = input.description.trim().to_owned();
    input.image = input
        .image
        .map(|i| i.trim().to_owned())
        .filter(|i| !i.is_empty());

    if input.name.is_empty() {
        return Err(CatalogError::Invalid("Product name is required".to_owned()));
    }
    if input.category.is_empty() {
        return Err(CatalogError::Invalid("Category is required".to_owned()));
    }
    if input.price < 0 {
        return Err(CatalogError::Invalid("Price cannot be negative".to_owned()));
    }
    Ok(input)
}
