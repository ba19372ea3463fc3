//! Dashboard handler.

use axum::{Json, extract::State};
use chrono::Utc;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::services::{DashboardStats, dashboard};
use crate::state::AppState;

/// Headline figures.
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    Ok(Json(dashboard::stats(state.pool(), Utc::now()).await?))
}
