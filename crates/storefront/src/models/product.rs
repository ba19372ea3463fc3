//! Catalog product types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aiaxcart_core::{ProductId, ProductStatus};

/// A sellable product with its derived stock level.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Lower-case category, e.g. `streaming`.
    pub category: String,
    /// Base price in whole currency units.
    pub price: i64,
    pub description: String,
    /// Optional image URL or emoji icon.
    pub image: Option<String>,
    pub status: ProductStatus,
    /// Available credentials of any account type. Counted on read, never stored.
    pub stock: i64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Icon to show for the product: its own image, else the category icon.
    #[must_use]
    pub fn icon(&self) -> &str {
        self.image
            .as_deref()
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| category_icon(&self.category))
    }

    /// Whether the storefront offers this product.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// Default icon for a category.
#[must_use]
pub fn category_icon(category: &str) -> &'static str {
    match category {
        "streaming" => "📺",
        "gaming" => "🎮",
        "software" => "💻",
        _ => "📦",
    }
}

/// Fields an admin supplies when creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
}
