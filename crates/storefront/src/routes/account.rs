//! Account route handlers for the signed-in buyer.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use aiaxcart_core::OrderId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::{AccountService, Profile};
use crate::state::AppState;

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders))
        .route("/orders/{id}/report", post(report_issue))
        .route("/active", get(active))
        .route("/expired", get(expired))
        .route("/profile", get(profile))
}

/// Issue report body.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub message: String,
}

/// Order history, newest first.
pub async fn orders(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = AccountService::new(state.pool())
        .orders(&user, Utc::now())
        .await?;
    Ok(Json(orders))
}

/// Delivered, unexpired accounts with their login details.
pub async fn active(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = AccountService::new(state.pool())
        .active(&user, Utc::now())
        .await?;
    Ok(Json(orders))
}

/// Expired accounts.
pub async fn expired(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = AccountService::new(state.pool())
        .expired(&user, Utc::now())
        .await?;
    Ok(Json(orders))
}

/// Profile summary.
pub async fn profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Profile>> {
    let profile = AccountService::new(state.pool())
        .profile(&user, Utc::now())
        .await?;
    Ok(Json(profile))
}

/// Report a problem with an order.
pub async fn report_issue(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(report): Json<ReportRequest>,
) -> Result<Json<Value>> {
    AccountService::new(state.pool())
        .report_issue(&user, id, &report.message)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Issue reported. We'll get back to you soon.",
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::Duration;

    use aiaxcart_core::{
        AccountType, CurrencyCode, Email, PaymentMethod, PlanDuration, ProfileType,
        PurchaseOptions, UserId, UserRole,
    };

    use super::*;
    use crate::db::testing as db;
    use crate::models::CurrentUser;
    use crate::routes::testing::{TestApp, app};
    use crate::services::{Checkout, OrderService};

    #[tokio::test]
    async fn test_expired_order_reads_expired() {
        let TestApp { router, pool } = app().await;
        let cookie = router.register("Ana", "ana@shop.ph").await;
        let product = db::product(&pool, "Netflix Premium", 299).await;
        db::credential(&pool, product.id, AccountType::Shared, "old@n.tv").await;
        db::credential(&pool, product.id, AccountType::Shared, "new@n.tv").await;

        // The registered user is the only one, so their id is 1.
        let buyer = CurrentUser {
            id: UserId::new(1),
            name: "Ana".to_owned(),
            email: Email::parse("ana@shop.ph").unwrap(),
            role: UserRole::User,
        };
        let service = OrderService::new(&pool);
        for delivered_at in [Utc::now() - Duration::days(8), Utc::now()] {
            let order = service
                .create_order(
                    &buyer,
                    Checkout {
                        product_id: product.id,
                        options: PurchaseOptions {
                            account_type: AccountType::Shared,
                            profile_type: ProfileType::Account,
                            duration: PlanDuration::SevenDays,
                        },
                        payment_method: PaymentMethod::Gcash,
                        payment_reference: "GC-1".to_owned(),
                    },
                    CurrencyCode::PHP,
                )
                .await
                .unwrap();
            service.deliver(order.id, delivered_at).await.unwrap();
        }

        let response = router
            .call(Method::GET, "/api/account/orders", Some(&cookie), None)
            .await;
        let orders = response.json.as_array().unwrap();
        assert_eq!(orders[0]["status"], "delivered");
        assert_eq!(orders[1]["status"], "expired");

        let response = router
            .call(Method::GET, "/api/account/active", Some(&cookie), None)
            .await;
        let active = response.json.as_array().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0]["credential"]["login"], "new@n.tv");

        let response = router
            .call(Method::GET, "/api/account/profile", Some(&cookie), None)
            .await;
        assert_eq!(response.json["total_orders"], 2);
        assert_eq!(response.json["total_spent"], 299);
    }

    #[tokio::test]
    async fn test_report_requires_own_order() {
        let TestApp { router, .. } = app().await;
        let cookie = router.register("Ana", "ana@shop.ph").await;

        let response = router
            .call(
                Method::POST,
                "/api/account/orders/5/report",
                Some(&cookie),
                Some(json!({ "message": "PIN doesn't work" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.json["error"], "Order not found");

        let response = router
            .call(Method::GET, "/api/account/profile", None, None)
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}
