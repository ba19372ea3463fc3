//! Checkout handler.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Serialize;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::{Checkout, OrderService};
use crate::state::AppState;

const ORDER_PLACED: &str =
    "Order placed successfully! Your account will be delivered after payment confirmation.";

/// Build the checkout router.
pub fn router() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub order: Order,
}

/// Place a pending order for the signed-in buyer.
pub async fn checkout(
    RequireAuth(buyer): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<Checkout>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let order = OrderService::new(state.pool())
        .create_order(&buyer, request, state.config().shop.currency)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: ORDER_PLACED,
            order,
        }),
    ))
}
