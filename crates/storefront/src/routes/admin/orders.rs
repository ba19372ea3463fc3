//! Order handling for the back office: listing, delivery and sales history.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Serialize;

use aiaxcart_core::OrderId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Order, OrderWithCustomer};
use crate::services::OrderService;
use crate::state::AppState;

const DELIVERED: &str = "Account delivered successfully!";

#[derive(Debug, Serialize)]
pub struct DeliveryResponse {
    pub message: &'static str,
    pub order: Order,
}

/// Every order with its buyer, newest first.
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithCustomer>>> {
    Ok(Json(
        OrderService::new(state.pool()).list_all(Utc::now()).await?,
    ))
}

/// Delivered and expired orders.
pub async fn sales(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithCustomer>>> {
    Ok(Json(
        OrderService::new(state.pool())
            .sales_history(Utc::now())
            .await?,
    ))
}

/// Allocate a credential to a pending order.
pub async fn deliver(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<DeliveryResponse>> {
    let order = OrderService::new(state.pool())
        .deliver(id, Utc::now())
        .await?;
    tracing::info!(admin_id = %admin.id, order_id = %order.id, "Admin delivered order");
    Ok(Json(DeliveryResponse {
        message: DELIVERED,
        order,
    }))
}
