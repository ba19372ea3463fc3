//! User and feedback listings.

use axum::{Json, extract::State};

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Feedback, User};
use crate::services::FeedbackService;
use crate::state::AppState;

/// Every registered user. Password hashes are never loaded.
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}

/// Every feedback entry.
pub async fn feedback(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Feedback>>> {
    Ok(Json(FeedbackService::new(state.pool()).list().await?))
}
