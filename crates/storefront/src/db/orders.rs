//! Order repository, including the delivery transaction.
//!
//! Orders are returned with their *stored* status. Readers project them with
//! [`Order::project`](crate::models::Order::project).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use aiaxcart_core::{
    CredentialId, CredentialSecret, OrderId, OrderStatus, ProductId, PurchaseOptions, UserId,
    expiry,
};

use super::{RepositoryError, parse_column};
use crate::models::{NewOrder, Order, OrderWithCustomer};

const ORDER_COLUMNS: &str = r"
    o.id, o.user_id, o.product_id, o.product_name, o.account_type, o.profile_type, o.duration,
    o.amount, o.payment_method, o.payment_reference, o.status, o.credential_id,
    o.credential_login, o.credential_password, o.credential_profile, o.credential_pin,
    o.delivered_at, o.expires_at, o.created_at
";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    product_name: String,
    account_type: String,
    profile_type: String,
    duration: String,
    amount: i64,
    payment_method: String,
    payment_reference: String,
    status: String,
    credential_id: Option<i64>,
    credential_login: Option<String>,
    credential_password: Option<String>,
    credential_profile: Option<String>,
    credential_pin: Option<String>,
    delivered_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = parse_column(&row.status)?;
        if !status.is_storable() {
            return Err(RepositoryError::DataCorruption(format!(
                "order {} has non-storable status {status}",
                row.id
            )));
        }

        let credential = match (row.credential_login, row.credential_password) {
            (Some(login), Some(password)) => Some(CredentialSecret {
                login,
                password,
                profile: row.credential_profile,
                pin: row.credential_pin,
            }),
            _ => None,
        };

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            options: PurchaseOptions {
                account_type: parse_column(&row.account_type)?,
                profile_type: parse_column(&row.profile_type)?,
                duration: parse_column(&row.duration)?,
            },
            amount: row.amount,
            payment_method: parse_column(&row.payment_method)?,
            payment_reference: row.payment_reference,
            status,
            credential_id: row.credential_id.map(CredentialId::new),
            credential,
            delivered_at: row.delivered_at,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderWithCustomerRow {
    #[sqlx(flatten)]
    order: OrderRow,
    user_name: String,
    user_email: String,
}

#[derive(sqlx::FromRow)]
struct AllocatableRow {
    id: i64,
    login: String,
    password: String,
    profile: Option<String>,
    pin: Option<String>,
}

/// Result of a delivery attempt. Every variant but `Delivered` left the
/// database untouched.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The order now holds a credential.
    Delivered(Order),
    /// No order with that ID.
    OrderNotFound,
    /// The order is no longer pending.
    AlreadyProcessed,
    /// No available credential matches the order's product and account type.
    OutOfStock,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pending order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO orders
                (user_id, product_id, product_name, account_type, profile_type, duration,
                 amount, payment_method, payment_reference, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?)
            RETURNING id
            ",
        )
        .bind(order.user_id.as_i64())
        .bind(order.product_id.as_i64())
        .bind(&order.product_name)
        .bind(order.options.account_type.as_str())
        .bind(order.options.profile_type.as_str())
        .bind(order.options.duration.as_str())
        .bind(order.amount)
        .bind(order.payment_method.as_str())
        .bind(&order.payment_reference)
        .bind(order.created_at)
        .fetch_one(self.pool)
        .await?;

        self.get(OrderId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = ?"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        row.map(Order::try_from).transpose()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.user_id = ? ORDER BY o.id DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// List every order with the buyer's name and email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_customers(&self) -> Result<Vec<OrderWithCustomer>, RepositoryError> {
        let rows: Vec<OrderWithCustomerRow> = sqlx::query_as(&format!(
            r"
            SELECT {ORDER_COLUMNS},
                   COALESCE(u.name, 'Unknown User') AS user_name,
                   COALESCE(u.email, 'Unknown Email') AS user_email
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            ORDER BY o.id DESC
            "
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(OrderWithCustomer {
                    order: Order::try_from(r.order)?,
                    user_name: r.user_name,
                    user_email: r.user_email,
                })
            })
            .collect()
    }

    /// List every order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders o ORDER BY o.id"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Allocate a credential to a pending order, in one transaction.
    ///
    /// Takes the lowest-id available credential for the order's product and
    /// account type, marks it sold, and stores a copy of its secret on the
    /// order with the delivery and expiry timestamps. Both writes are guarded
    /// by their expected prior status, so a concurrent delivery can never
    /// claim the same credential or deliver the same order twice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails. The transaction
    /// is rolled back.
    pub async fn deliver(
        &self,
        id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<DeliveryOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = ?"))
                .bind(id.as_i64())
                .fetch_optional(&mut *tx)
                .await?;
        let Some(mut order) = row.map(Order::try_from).transpose()? else {
            return Ok(DeliveryOutcome::OrderNotFound);
        };
        if order.status != OrderStatus::Pending {
            return Ok(DeliveryOutcome::AlreadyProcessed);
        }

        let candidate: Option<AllocatableRow> = sqlx::query_as(
            r"
            SELECT id, login, password, profile, pin
            FROM credentials
            WHERE product_id = ? AND account_type = ? AND status = 'available'
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(order.product_id.as_i64())
        .bind(order.options.account_type.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(candidate) = candidate else {
            return Ok(DeliveryOutcome::OutOfStock);
        };

        let expires_at = expiry::expires_at(order.options.duration, now).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("expiry for order {id} is out of range"))
        })?;

        let claimed = sqlx::query(
            "UPDATE credentials SET status = 'sold' WHERE id = ? AND status = 'available'",
        )
        .bind(candidate.id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Ok(DeliveryOutcome::OutOfStock);
        }

        let updated = sqlx::query(
            r"
            UPDATE orders
            SET status = 'delivered',
                credential_id = ?,
                credential_login = ?,
                credential_password = ?,
                credential_profile = ?,
                credential_pin = ?,
                delivered_at = ?,
                expires_at = ?
            WHERE id = ? AND status = 'pending'
            ",
        )
        .bind(candidate.id)
        .bind(&candidate.login)
        .bind(&candidate.password)
        .bind(candidate.profile.as_deref())
        .bind(candidate.pin.as_deref())
        .bind(now)
        .bind(expires_at)
        .bind(id.as_i64())
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Ok(DeliveryOutcome::AlreadyProcessed);
        }

        tx.commit().await?;

        order.status = OrderStatus::Delivered;
        order.credential_id = Some(CredentialId::new(candidate.id));
        order.credential = Some(CredentialSecret {
            login: candidate.login,
            password: candidate.password,
            profile: candidate.profile,
            pin: candidate.pin,
        });
        order.delivered_at = Some(now);
        order.expires_at = Some(expires_at);

        Ok(DeliveryOutcome::Delivered(order))
    }

    /// Count orders referencing a credential.
    #[cfg(test)]
    pub async fn count_for_credential(&self, id: CredentialId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE credential_id = ?")
            .bind(id.as_i64())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use aiaxcart_core::{
        AccountType, CredentialStatus, PaymentMethod, PlanDuration, ProfileType, UserRole,
    };

    use super::*;
    use crate::db::{CredentialRepository, testing};

    async fn pending_order(
        pool: &SqlitePool,
        user_id: UserId,
        product_id: ProductId,
        account_type: AccountType,
        duration: PlanDuration,
    ) -> Order {
        OrderRepository::new(pool)
            .create(&NewOrder {
                user_id,
                product_id,
                product_name: "Netflix Premium".to_owned(),
                options: PurchaseOptions {
                    account_type,
                    profile_type: ProfileType::Account,
                    duration,
                },
                amount: 299,
                payment_method: PaymentMethod::Gcash,
                payment_reference: "GC-0001".to_owned(),
                created_at: Utc::now(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_is_pending_without_credential() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "Juan", "juan@shop.ph", UserRole::User).await;
        let product = testing::product(&pool, "Netflix Premium", 299).await;

        let order = pending_order(
            &pool,
            user,
            product.id,
            AccountType::Shared,
            PlanDuration::OneMonth,
        )
        .await;
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.credential_id.is_none());
        assert!(order.credential.is_none());
        assert!(order.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_deliver_takes_lowest_matching_credential() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "Juan", "juan@shop.ph", UserRole::User).await;
        let product = testing::product(&pool, "Netflix Premium", 299).await;
        testing::credential(&pool, product.id, AccountType::Shared, "shared@n.tv").await;
        let first_solo =
            testing::credential(&pool, product.id, AccountType::Solo, "solo1@n.tv").await;
        testing::credential(&pool, product.id, AccountType::Solo, "solo2@n.tv").await;

        let order = pending_order(
            &pool,
            user,
            product.id,
            AccountType::Solo,
            PlanDuration::SevenDays,
        )
        .await;
        let now = Utc::now();

        let DeliveryOutcome::Delivered(delivered) =
            OrderRepository::new(&pool).deliver(order.id, now).await.unwrap()
        else {
            panic!("expected delivery");
        };
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(delivered.credential_id, Some(first_solo));
        assert_eq!(
            delivered.credential.as_ref().map(|c| c.login.as_str()),
            Some("solo1@n.tv")
        );
        assert_eq!(delivered.expires_at, Some(now + Duration::days(7)));

        let credential = CredentialRepository::new(&pool)
            .get(first_solo)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.status, CredentialStatus::Sold);

        let stored = OrderRepository::new(&pool)
            .get(order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, OrderStatus::Delivered);
        assert_eq!(
            stored.delivered_at.map(|t| t.timestamp()),
            Some(now.timestamp())
        );
    }

    #[tokio::test]
    async fn test_deliver_twice_is_already_processed() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "Juan", "juan@shop.ph", UserRole::User).await;
        let product = testing::product(&pool, "Netflix Premium", 299).await;
        testing::credential(&pool, product.id, AccountType::Shared, "a@n.tv").await;
        testing::credential(&pool, product.id, AccountType::Shared, "b@n.tv").await;
        let order = pending_order(
            &pool,
            user,
            product.id,
            AccountType::Shared,
            PlanDuration::OneMonth,
        )
        .await;
        let repo = OrderRepository::new(&pool);

        let first = repo.deliver(order.id, Utc::now()).await.unwrap();
        let DeliveryOutcome::Delivered(first) = first else {
            panic!("expected delivery");
        };

        let second = repo.deliver(order.id, Utc::now()).await.unwrap();
        assert!(matches!(second, DeliveryOutcome::AlreadyProcessed));

        let stored = repo.get(order.id).await.unwrap().unwrap();
        assert_eq!(stored.credential_id, first.credential_id);
        assert_eq!(stored.expires_at, first.expires_at);

        // The second credential is still in stock.
        let available = CredentialRepository::new(&pool)
            .count_available(product.id, AccountType::Shared)
            .await
            .unwrap();
        assert_eq!(available, 1);
    }

    #[tokio::test]
    async fn test_deliver_without_stock_changes_nothing() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "Juan", "juan@shop.ph", UserRole::User).await;
        let product = testing::product(&pool, "Netflix Premium", 299).await;
        testing::credential(&pool, product.id, AccountType::Shared, "a@n.tv").await;
        let order = pending_order(
            &pool,
            user,
            product.id,
            AccountType::Solo,
            PlanDuration::OneMonth,
        )
        .await;
        let repo = OrderRepository::new(&pool);

        let outcome = repo.deliver(order.id, Utc::now()).await.unwrap();
        assert!(matches!(outcome, DeliveryOutcome::OutOfStock));

        let stored = repo.get(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(
            CredentialRepository::new(&pool)
                .count_by_status(CredentialStatus::Sold)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_deliver_unknown_order() {
        let pool = testing::pool().await;
        let outcome = OrderRepository::new(&pool)
            .deliver(OrderId::new(12), Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, DeliveryOutcome::OrderNotFound));
    }

    #[tokio::test]
    async fn test_each_sold_credential_has_exactly_one_order() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "Juan", "juan@shop.ph", UserRole::User).await;
        let product = testing::product(&pool, "Netflix Premium", 299).await;
        for login in ["a@n.tv", "b@n.tv", "c@n.tv"] {
            testing::credential(&pool, product.id, AccountType::Shared, login).await;
        }
        let repo = OrderRepository::new(&pool);
        for _ in 0..2 {
            let order = pending_order(
                &pool,
                user,
                product.id,
                AccountType::Shared,
                PlanDuration::ThreeMonths,
            )
            .await;
            repo.deliver(order.id, Utc::now()).await.unwrap();
        }

        for listing in CredentialRepository::new(&pool).list().await.unwrap() {
            let refs = repo
                .count_for_credential(listing.credential.id)
                .await
                .unwrap();
            let sold = listing.credential.status == CredentialStatus::Sold;
            assert_eq!(sold, refs == 1, "credential {}", listing.credential.id);
            assert!(refs <= 1);
        }
    }

    #[tokio::test]
    async fn test_list_with_customers_joins_buyer() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "Maria", "maria@shop.ph", UserRole::User).await;
        let product = testing::product(&pool, "Netflix Premium", 299).await;
        pending_order(
            &pool,
            user,
            product.id,
            AccountType::Shared,
            PlanDuration::OneMonth,
        )
        .await;

        let listed = OrderRepository::new(&pool)
            .list_with_customers()
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_name, "Maria");
        assert_eq!(listed[0].user_email, "maria@shop.ph");
    }
}
