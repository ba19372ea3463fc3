//! Product administration handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use aiaxcart_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product};
use crate::services::CatalogService;
use crate::state::AppState;

/// Every product, active or not.
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(CatalogService::new(state.pool()).all_products().await?))
}

/// Add a product.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = CatalogService::new(state.pool())
        .create_product(input)
        .await?;
    tracing::info!(admin_id = %admin.id, product_id = %product.id, "Admin added product");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<NewProduct>,
) -> Result<Json<Product>> {
    Ok(Json(
        CatalogService::new(state.pool())
            .update_product(id, input)
            .await?,
    ))
}

/// Delete an unreferenced product.
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    CatalogService::new(state.pool()).delete_product(id).await?;
    tracing::info!(admin_id = %admin.id, product_id = %id, "Admin deleted product");
    Ok(StatusCode::NO_CONTENT)
}
