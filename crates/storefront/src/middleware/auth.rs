//! Authentication extractors.
//!
//! The logged-in user lives in the session under
//! [`session_keys::CURRENT_USER`]. Rejections are JSON errors: 401 for
//! anonymous callers, 403 for signed-in non-admins on admin routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

const LOGIN_REQUIRED: &str = "Please log in to continue";
const ADMIN_REQUIRED: &str = "Admin access required";

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED.to_owned()))
    }
}

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)
            .await
            .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED.to_owned()))?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin hit admin route");
            return Err(AppError::Forbidden(ADMIN_REQUIRED.to_owned()));
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Store the logged-in user in the session, rotating the session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
