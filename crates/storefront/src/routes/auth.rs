//! Authentication route handlers.
//!
//! Register, log in and log out with email and password. The session keeps a
//! [`CurrentUser`] snapshot.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    OptionalAuth, auth_rate_limiter, clear_current_user, set_current_user,
};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Build the auth router. Credential-checking routes are rate limited.
pub fn router() -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(limited)
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Registration body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register a customer and log them in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool())
        .register(&form.name, &form.email, &form.password)
        .await?;
    start_session(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Login failed"))?;
    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(user))
}

/// Log out.
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "success": true })))
}

/// The current session user.
pub async fn me(OptionalAuth(user): OptionalAuth) -> Result<Json<CurrentUser>> {
    user.map(Json)
        .ok_or_else(|| AppError::Unauthorized("Not logged in".to_owned()))
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}
