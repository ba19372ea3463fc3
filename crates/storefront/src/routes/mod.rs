//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET  /api/products?category=     - Active products with stock
//! GET  /api/products/{id}          - One product with stock
//! POST /api/quote                  - Price a selection
//!
//! # Auth (rate limited)
//! POST /api/auth/register          - Register and log in
//! POST /api/auth/login             - Log in
//! POST /api/auth/logout            - Log out
//! GET  /api/auth/me                - Current session user
//!
//! # Checkout and account (requires auth)
//! POST /api/checkout               - Place a pending order
//! GET  /api/account/orders         - Order history
//! GET  /api/account/active         - Active accounts
//! GET  /api/account/expired        - Expired accounts
//! GET  /api/account/profile        - Profile summary
//! POST /api/account/orders/{id}/report - Report an issue
//!
//! # Feedback
//! GET  /api/feedback               - All feedback
//! POST /api/feedback               - Submit feedback (requires auth)
//!
//! # Back office (requires admin)
//! GET  /api/admin/dashboard
//! GET  /api/admin/products         POST creates
//! PUT  /api/admin/products/{id}    DELETE deletes
//! GET  /api/admin/stock            POST adds a credential
//! PUT  /api/admin/stock/{id}
//! GET  /api/admin/orders
//! POST /api/admin/orders/{id}/deliver
//! GET  /api/admin/sales
//! GET  /api/admin/users
//! GET  /api/admin/feedback
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod checkout;
pub mod feedback;
pub mod products;

use axum::{Router, middleware::from_fn};
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::SqliteStore;

use crate::middleware::{
    api_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Every `/api` route.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(products::router())
        .nest("/auth", auth::router())
        .merge(checkout::router())
        .nest("/account", account::router())
        .merge(feedback::router())
        .nest("/admin", admin::router())
        .layer(api_rate_limiter());

    Router::new().nest("/api", api)
}

/// The API with sessions and the shop's middleware applied.
///
/// Health checks and Sentry layers are added by the binary.
pub fn app(state: AppState, sessions: SessionManagerLayer<SqliteStore>) -> Router<()> {
    Router::new()
        .merge(routes())
        .layer(sessions)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
