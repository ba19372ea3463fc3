//! Order workflow: checkout, delivery and back-office order views.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use aiaxcart_core::{
    CurrencyCode, OrderId, OrderStatus, PaymentMethod, Price, ProductId, ProductStatus,
    PurchaseOptions, pricing,
};

use super::notify;
use crate::db::{
    CredentialRepository, DeliveryOutcome, OrderRepository, ProductRepository, RepositoryError,
};
use crate::models::{CurrentUser, NewOrder, Order, OrderWithCustomer};

/// Errors from the order workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("No accounts available for this product/type")]
    OutOfStock,

    #[error("Payment reference is required")]
    MissingPaymentReference,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Order already processed")]
    AlreadyProcessed,

    #[error("No accounts available for delivery")]
    NoDeliveryStock,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A checkout submitted by a signed-in buyer.
#[derive(Debug, Clone, Deserialize)]
pub struct Checkout {
    pub product_id: ProductId,
    #[serde(flatten)]
    pub options: PurchaseOptions,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
}

/// Order workflow operations.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    products: ProductRepository<'a>,
    credentials: CredentialRepository<'a>,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            products: ProductRepository::new(pool),
            credentials: CredentialRepository::new(pool),
        }
    }

    /// Place a pending order for the buyer.
    ///
    /// Nothing is written unless the product is listed as active and has at least one
    /// available credential of the requested account type.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::ProductNotFound`, `OrderError::OutOfStock` or
    /// `OrderError::MissingPaymentReference` when the checkout can't be placed.
    #[instrument(skip(self, buyer, checkout), fields(user_id = %buyer.id, product_id = %checkout.product_id))]
    pub async fn create_order(
        &self,
        buyer: &CurrentUser,
        checkout: Checkout,
        currency: CurrencyCode,
    ) -> Result<Order, OrderError> {
        let payment_reference = checkout.payment_reference.trim();
        if payment_reference.is_empty() {
            return Err(OrderError::MissingPaymentReference);
        }

        let product = self
            .products
            .get(checkout.product_id)
            .await?
            .filter(|p| p.status == ProductStatus::Active)
            .ok_or(OrderError::ProductNotFound)?;

        let available = self
            .credentials
            .count_available(product.id, checkout.options.account_type)
            .await?;
        if available == 0 {
            return Err(OrderError::OutOfStock);
        }

        let amount = pricing::calculate_total(product.price, &checkout.options);
        let order = self
            .orders
            .create(&NewOrder {
                user_id: buyer.id,
                product_id: product.id,
                product_name: product.name,
                options: checkout.options,
                amount,
                payment_method: checkout.payment_method,
                payment_reference: payment_reference.to_owned(),
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(order_id = %order.id, amount, "Order placed");
        notify::order_placed(&order, buyer, Price::new(amount, currency));
        Ok(order)
    }

    /// Allocate a credential to a pending order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound`, `OrderError::AlreadyProcessed` or
    /// `OrderError::NoDeliveryStock`; in each case nothing changed.
    #[instrument(skip(self))]
    pub async fn deliver(&self, id: OrderId, now: DateTime<Utc>) -> Result<Order, OrderError> {
        match self.orders.deliver(id, now).await? {
            DeliveryOutcome::Delivered(order) => {
                tracing::info!(order_id = %order.id, credential_id = ?order.credential_id, "Order delivered");
                notify::order_delivered(&order);
                Ok(order)
            }
            DeliveryOutcome::OrderNotFound => Err(OrderError::OrderNotFound),
            DeliveryOutcome::AlreadyProcessed => Err(OrderError::AlreadyProcessed),
            DeliveryOutcome::OutOfStock => {
                tracing::warn!(order_id = %id, "No stock to deliver order");
                Err(OrderError::NoDeliveryStock)
            }
        }
    }

    /// Every order with its buyer, projected at `now`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_all(&self, now: DateTime<Utc>) -> Result<Vec<OrderWithCustomer>, OrderError> {
        Ok(self
            .orders
            .list_with_customers()
            .await?
            .into_iter()
            .map(|o| o.project(now))
            .collect())
    }

    /// Fulfilled orders, whether or not they have since expired.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn sales_history(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderWithCustomer>, OrderError> {
        let mut orders = self.list_all(now).await?;
        orders.retain(|o| o.order.is_fulfilled());
        Ok(orders)
    }

    /// A buyer's orders, projected at `now`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_user(
        &self,
        buyer: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(self
            .orders
            .list_for_user(buyer.id)
            .await?
            .into_iter()
            .map(|o| o.project(now))
            .collect())
    }

    /// A single order as the given buyer sees it.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if it doesn't exist or belongs to
    /// someone else.
    pub async fn get_for_user(
        &self,
        buyer: &CurrentUser,
        id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        self.orders
            .get(id)
            .await?
            .filter(|o| o.user_id == buyer.id)
            .map(|o| o.project(now))
            .ok_or(OrderError::OrderNotFound)
    }

    /// Every order with its stored status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn stored(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list().await?)
    }
}

/// Whether a stored order counts towards revenue.
#[must_use]
pub fn is_sale(order: &Order) -> bool {
    order.status != OrderStatus::Pending
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use aiaxcart_core::{AccountType, Email, PlanDuration, ProfileType, UserRole};

    use super::*;
    use crate::db::testing;
    use crate::models::NewProduct;

    async fn buyer(pool: &SqlitePool) -> CurrentUser {
        let id = testing::user(pool, "Juan", "juan@shop.ph", UserRole::User).await;
        CurrentUser {
            id,
            name: "Juan".to_owned(),
            email: Email::parse("juan@shop.ph").unwrap(),
            role: UserRole::User,
        }
    }

    fn checkout(product_id: ProductId, account_type: AccountType) -> Checkout {
        Checkout {
            product_id,
            options: PurchaseOptions {
                account_type,
                profile_type: ProfileType::Profile,
                duration: PlanDuration::ThreeMonths,
            },
            payment_method: PaymentMethod::Gcash,
            payment_reference: " GC-778 ".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create_order_prices_and_stays_pending() {
        let pool = testing::pool().await;
        let buyer = buyer(&pool).await;
        let product = testing::product(&pool, "Netflix Premium", 160).await;
        testing::credential(&pool, product.id, AccountType::Solo, "solo@n.tv").await;

        let order = OrderService::new(&pool)
            .create_order(
                &buyer,
                checkout(product.id, AccountType::Solo),
                CurrencyCode::PHP,
            )
            .await
            .unwrap();
        assert_eq!(order.amount, 620);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_reference, "GC-778");
        assert_eq!(order.product_name, "Netflix Premium");
    }

    #[tokio::test]
    async fn test_create_order_without_stock_writes_nothing() {
        let pool = testing::pool().await;
        let buyer = buyer(&pool).await;
        let product = testing::product(&pool, "Netflix Premium", 160).await;
        testing::credential(&pool, product.id, AccountType::Shared, "shared@n.tv").await;

        let service = OrderService::new(&pool);
        let err = service
            .create_order(
                &buyer,
                checkout(product.id, AccountType::Solo),
                CurrencyCode::PHP,
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No accounts available for this product/type");
        assert!(service.stored().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_rejects_unknown_product_and_blank_reference() {
        let pool = testing::pool().await;
        let buyer = buyer(&pool).await;
        let service = OrderService::new(&pool);

        let err = service
            .create_order(
                &buyer,
                checkout(ProductId::new(40), AccountType::Solo),
                CurrencyCode::PHP,
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Product not found");

        let mut blank = checkout(ProductId::new(40), AccountType::Solo);
        blank.payment_reference = "   ".to_owned();
        assert!(matches!(
            service
                .create_order(&buyer, blank, CurrencyCode::PHP)
                .await,
            Err(OrderError::MissingPaymentReference)
        ));
    }

    #[tokio::test]
    async fn test_create_order_rejects_inactive_product() {
        let pool = testing::pool().await;
        let buyer = buyer(&pool).await;
        let product = testing::product(&pool, "Netflix Premium", 160).await;
        testing::credential(&pool, product.id, AccountType::Solo, "solo@n.tv").await;
        ProductRepository::new(&pool)
            .update(
                product.id,
                &NewProduct {
                    name: product.name.clone(),
                    category: product.category.clone(),
                    price: product.price,
                    description: product.description.clone(),
                    image: None,
                    status: ProductStatus::Inactive,
                },
            )
            .await
            .unwrap();

        let service = OrderService::new(&pool);
        let err = service
            .create_order(
                &buyer,
                checkout(product.id, AccountType::Solo),
                CurrencyCode::PHP,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound));
        assert!(service.stored().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deliver_twice_reports_already_processed() {
        let pool = testing::pool().await;
        let buyer = buyer(&pool).await;
        let product = testing::product(&pool, "Netflix Premium", 160).await;
        testing::credential(&pool, product.id, AccountType::Solo, "a@n.tv").await;
        testing::credential(&pool, product.id, AccountType::Solo, "b@n.tv").await;
        let service = OrderService::new(&pool);
        let order = service
            .create_order(
                &buyer,
                checkout(product.id, AccountType::Solo),
                CurrencyCode::PHP,
            )
            .await
            .unwrap();

        let delivered = service.deliver(order.id, Utc::now()).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);

        let err = service.deliver(order.id, Utc::now()).await.unwrap_err();
        assert_eq!(err.to_string(), "Order already processed");

        let err = service
            .deliver(OrderId::new(99), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Order not found");
    }

    #[tokio::test]
    async fn test_deliver_without_stock() {
        let pool = testing::pool().await;
        let buyer = buyer(&pool).await;
        let product = testing::product(&pool, "Netflix Premium", 160).await;
        let credential =
            testing::credential(&pool, product.id, AccountType::Solo, "only@n.tv").await;
        let service = OrderService::new(&pool);

        let first = service
            .create_order(
                &buyer,
                checkout(product.id, AccountType::Solo),
                CurrencyCode::PHP,
            )
            .await
            .unwrap();
        let second = service
            .create_order(
                &buyer,
                checkout(product.id, AccountType::Solo),
                CurrencyCode::PHP,
            )
            .await
            .unwrap();

        let delivered = service.deliver(first.id, Utc::now()).await.unwrap();
        assert_eq!(delivered.credential_id, Some(credential));

        let err = service.deliver(second.id, Utc::now()).await.unwrap_err();
        assert_eq!(err.to_string(), "No accounts available for delivery");
    }

    #[tokio::test]
    async fn test_reads_project_expired_orders() {
        let pool = testing::pool().await;
        let buyer = buyer(&pool).await;
        let product = testing::product(&pool, "Netflix Premium", 160).await;
        testing::credential(&pool, product.id, AccountType::Solo, "a@n.tv").await;
        let service = OrderService::new(&pool);
        let order = service
            .create_order(
                &buyer,
                checkout(product.id, AccountType::Solo),
                CurrencyCode::PHP,
            )
            .await
            .unwrap();
        let delivered_at = Utc::now() - Duration::days(200);
        service.deliver(order.id, delivered_at).await.unwrap();

        let now = Utc::now();
        let mine = service.list_for_user(&buyer, now).await.unwrap();
        assert_eq!(mine[0].status, OrderStatus::Expired);

        let sales = service.sales_history(now).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].order.status, OrderStatus::Expired);

        // Stored record is untouched.
        let stored = service.stored().await.unwrap();
        assert_eq!(stored[0].status, OrderStatus::Delivered);
        assert!(is_sale(&stored[0]));
    }
}
