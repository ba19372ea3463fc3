//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client with `{"error": "<message>"}`. All route
//! handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{
    AccountError, AuthError, CatalogError, FeedbackError, InventoryError, OrderError,
};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Too many requests, please try again later")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_)
                | AuthError::MissingName
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Catalog(err) => match err {
                CatalogError::ProductNotFound => StatusCode::NOT_FOUND,
                CatalogError::ProductInUse => StatusCode::CONFLICT,
                CatalogError::Invalid(_) => StatusCode::BAD_REQUEST,
                CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Inventory(err) => match err {
                InventoryError::ProductNotFound | InventoryError::CredentialNotFound => {
                    StatusCode::NOT_FOUND
                }
                InventoryError::CredentialSold => StatusCode::CONFLICT,
                InventoryError::IncompleteSecret => StatusCode::BAD_REQUEST,
                InventoryError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => order_status(err),
            Self::Account(err) => match err {
                AccountError::OrderNotFound | AccountError::UserNotFound => StatusCode::NOT_FOUND,
                AccountError::EmptyReport => StatusCode::BAD_REQUEST,
                AccountError::Order(inner) => order_status(inner),
                AccountError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Feedback(err) => match err {
                FeedbackError::MissingField | FeedbackError::InvalidImage => {
                    StatusCode::BAD_REQUEST
                }
                FeedbackError::ImageTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                FeedbackError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

const fn order_status(err: &OrderError) -> StatusCode {
    match err {
        OrderError::ProductNotFound | OrderError::OrderNotFound => StatusCode::NOT_FOUND,
        OrderError::OutOfStock | OrderError::AlreadyProcessed | OrderError::NoDeliveryStock => {
            StatusCode::CONFLICT
        }
        OrderError::MissingPaymentReference => StatusCode::BAD_REQUEST,
        OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_owned()
        } else {
            match &self {
                Self::Auth(AuthError::InvalidEmail(_)) => "Invalid email address".to_owned(),
                Self::Auth(AuthError::UserNotFound) => {
                    AuthError::InvalidCredentials.to_string()
                }
                _ => self.to_string(),
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_workflow_failures_keep_their_message() {
        let (status, json) = body(OrderError::AlreadyProcessed.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "Order already processed");

        let (status, json) = body(OrderError::OutOfStock.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "No accounts available for this product/type");

        let (status, json) = body(AuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_server_errors_are_hidden() {
        let (status, json) = body(AppError::Internal("pool closed".to_owned())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");

        let (status, _) = body(CatalogError::Repository(RepositoryError::NotFound).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".to_owned()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("x".to_owned()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AppError::from(CatalogError::ProductInUse).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(AccountError::EmptyReport).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
