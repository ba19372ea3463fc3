//! Back-office route handlers. Every handler takes [`RequireAdmin`].
//!
//! [`RequireAdmin`]: crate::middleware::RequireAdmin

pub mod dashboard;
pub mod orders;
pub mod products;
pub mod stock;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::show))
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::destroy),
        )
        .route("/stock", get(stock::index).post(stock::create))
        .route("/stock/{id}", put(stock::update))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/deliver", post(orders::deliver))
        .route("/sales", get(orders::sales))
        .route("/users", get(users::index))
        .route("/feedback", get(users::feedback))
}
