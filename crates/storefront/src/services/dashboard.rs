//! Back-office dashboard figures.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use aiaxcart_core::{CredentialStatus, OrderStatus, UserRole};

use super::orders::is_sale;
use crate::db::{
    CredentialRepository, OrderRepository, ProductRepository, RepositoryError, UserRepository,
};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    /// Customers only; admins aren't counted.
    pub total_users: i64,
    pub total_orders: usize,
    /// Orders created on the current UTC date.
    pub today_orders: usize,
    pub available_accounts: i64,
    pub sold_accounts: i64,
    /// Sum of delivered order amounts.
    pub total_sales: i64,
    pub pending_orders: usize,
}

/// Compute dashboard stats as of `now`.
///
/// # Errors
///
/// Returns `RepositoryError` if any query fails.
pub async fn stats(pool: &SqlitePool, now: DateTime<Utc>) -> Result<DashboardStats, RepositoryError> {
    let credentials = CredentialRepository::new(pool);
    let orders = OrderRepository::new(pool).list().await?;
    let today = now.date_naive();

    Ok(DashboardStats {
        total_products: ProductRepository::new(pool).count().await?,
        total_users: UserRepository::new(pool).count_by_role(UserRole::User).await?,
        total_orders: orders.len(),
        today_orders: orders
            .iter()
            .filter(|o| o.created_at.date_naive() == today)
            .count(),
        available_accounts: credentials.count_by_status(CredentialStatus::Available).await?,
        sold_accounts: credentials.count_by_status(CredentialStatus::Sold).await?,
        total_sales: orders.iter().filter(|o| is_sale(o)).map(|o| o.amount).sum(),
        pending_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aiaxcart_core::{
        AccountType, CurrencyCode, Email, PaymentMethod, PlanDuration, ProfileType,
        PurchaseOptions,
    };

    use super::*;
    use crate::db::testing;
    use crate::models::CurrentUser;
    use crate::services::orders::{Checkout, OrderService};

    #[tokio::test]
    async fn test_empty_shop() {
        let pool = testing::pool().await;
        assert_eq!(
            stats(&pool, Utc::now()).await.unwrap(),
            DashboardStats::default()
        );
    }

    #[tokio::test]
    async fn test_counts_sales_and_stock() {
        let pool = testing::pool().await;
        testing::user(&pool, "Admin", "admin@shop.ph", UserRole::Admin).await;
        let id = testing::user(&pool, "Ana", "ana@shop.ph", UserRole::User).await;
        let buyer = CurrentUser {
            id,
            name: "Ana".to_owned(),
            email: Email::parse("ana@shop.ph").unwrap(),
            role: UserRole::User,
        };
        let product = testing::product(&pool, "YouTube Premium", 249).await;
        for login in ["a@yt", "b@yt", "c@yt"] {
            testing::credential(&pool, product.id, AccountType::Shared, login).await;
        }

        let service = OrderService::new(&pool);
        let checkout = Checkout {
            product_id: product.id,
            options: PurchaseOptions {
                account_type: AccountType::Shared,
                profile_type: ProfileType::Account,
                duration: PlanDuration::SevenDays,
            },
            payment_method: PaymentMethod::Bank,
            payment_reference: "BDO-55".to_owned(),
        };
        let first = service
            .create_order(&buyer, checkout.clone(), CurrencyCode::PHP)
            .await
            .unwrap();
        service
            .create_order(&buyer, checkout, CurrencyCode::PHP)
            .await
            .unwrap();
        service.deliver(first.id, Utc::now()).await.unwrap();

        let stats = stats(&pool, Utc::now()).await.unwrap();
        assert_eq!(stats.total_products, 1);
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.today_orders, 2);
        assert_eq!(stats.available_accounts, 2);
        assert_eq!(stats.sold_accounts, 1);
        assert_eq!(stats.total_sales, 249);
        assert_eq!(stats.pending_orders, 1);
    }
}
