//! Catalog route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use aiaxcart_core::pricing::Quote;
use aiaxcart_core::{Price, ProductId, PurchaseOptions};

use crate::error::Result;
use crate::models::Product;
use crate::services::CatalogService;
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index))
        .route("/products/{id}", get(show))
        .route("/quote", post(quote))
}

/// Catalog filter.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

/// A selection to price.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub product_id: ProductId,
    #[serde(flatten)]
    pub options: PurchaseOptions,
}

/// Priced selection.
#[derive(Debug, serde::Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: Quote,
    /// Total formatted in the shop currency.
    pub display: String,
}

/// Active products with stock.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = CatalogService::new(state.pool())
        .storefront_products(query.category.as_deref())
        .await?;
    Ok(Json(products))
}

/// One product with stock.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(CatalogService::new(state.pool()).product(id).await?))
}

/// Price a selection.
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let quote = CatalogService::new(state.pool())
        .quote(request.product_id, &request.options)
        .await?;
    let display = Price::new(quote.total, state.config().shop.currency).to_string();
    Ok(Json(QuoteResponse { quote, display }))
}
