//! Credential stock handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use aiaxcart_core::{AccountType, CredentialId, CredentialSecret, ProductId};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Credential, CredentialListing};
use crate::services::InventoryService;
use crate::state::AppState;

/// A credential to add to stock.
#[derive(Debug, Deserialize)]
pub struct NewStock {
    pub product_id: ProductId,
    pub account_type: AccountType,
    #[serde(flatten)]
    pub secret: CredentialSecret,
}

/// Every credential with its product name.
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<CredentialListing>>> {
    Ok(Json(InventoryService::new(state.pool()).list().await?))
}

/// Add a credential.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<NewStock>,
) -> Result<(StatusCode, Json<Credential>)> {
    let credential = InventoryService::new(state.pool())
        .add(input.product_id, input.account_type, input.secret)
        .await?;
    Ok((StatusCode::CREATED, Json(credential)))
}

/// Replace an unsold credential's login details.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CredentialId>,
    Json(secret): Json<CredentialSecret>,
) -> Result<Json<Credential>> {
    Ok(Json(
        InventoryService::new(state.pool())
            .update(id, secret)
            .await?,
    ))
}
