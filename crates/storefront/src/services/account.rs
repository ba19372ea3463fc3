//! The signed-in buyer's own views: orders, accounts and profile.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use aiaxcart_core::{Email, OrderCounts, OrderId, OrderStatus};

use super::notify;
use super::orders::{OrderError, OrderService};
use crate::db::{RepositoryError, UserRepository};
use crate::models::{CurrentUser, Order};

/// Errors from account views.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Order not found")]
    OrderNotFound,

    #[error("Please describe the issue")]
    EmptyReport,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Order(OrderError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<OrderError> for AccountError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound => Self::OrderNotFound,
            OrderError::Repository(e) => Self::Repository(e),
            other => Self::Order(other),
        }
    }
}

/// Profile summary.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub name: String,
    pub email: Email,
    pub member_since: DateTime<Utc>,
    pub total_orders: u64,
    /// Sum of the amounts of orders still delivered and not yet expired.
    pub total_spent: i64,
    pub counts: OrderCounts,
}

/// Account views for one buyer.
pub struct AccountService<'a> {
    orders: OrderService<'a>,
    users: UserRepository<'a>,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            orders: OrderService::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// All of the buyer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the query fails.
    pub async fn orders(
        &self,
        buyer: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<Vec<Order>, AccountError> {
        Ok(self.orders.list_for_user(buyer, now).await?)
    }

    /// Delivered orders that haven't expired, with their login details.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the query fails.
    pub async fn active(
        &self,
        buyer: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<Vec<Order>, AccountError> {
        let mut orders = self.orders(buyer, now).await?;
        orders.retain(|o| o.is_active() && o.expires_at.is_some_and(|e| e > now));
        Ok(orders)
    }

    /// Orders past their expiry. An order whose expiry is exactly `now`
    /// already counts as expired.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the query fails.
    pub async fn expired(
        &self,
        buyer: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<Vec<Order>, AccountError> {
        let mut orders = self.orders(buyer, now).await?;
        orders.retain(|o| {
            o.status == OrderStatus::Expired || o.expires_at.is_some_and(|e| e <= now)
        });
        Ok(orders)
    }

    /// Profile summary with order totals.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the session user was removed.
    pub async fn profile(
        &self,
        buyer: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<Profile, AccountError> {
        let user = self
            .users
            .get_by_id(buyer.id)
            .await?
            .ok_or(AccountError::UserNotFound)?;
        let orders = self.orders(buyer, now).await?;

        let mut counts = OrderCounts::default();
        let mut total_spent = 0;
        for order in &orders {
            counts.record(order.status);
            if order.is_active() {
                total_spent += order.amount;
            }
        }

        Ok(Profile {
            name: user.name,
            email: user.email,
            member_since: user.created_at,
            total_orders: counts.total(),
            total_spent,
            counts,
        })
    }

    /// Report a problem with one of the buyer's orders.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::EmptyReport` for a blank message and
    /// `AccountError::OrderNotFound` if the order isn't the buyer's.
    #[instrument(skip(self, buyer, message), fields(user_id = %buyer.id))]
    pub async fn report_issue(
        &self,
        buyer: &CurrentUser,
        order_id: OrderId,
        message: &str,
    ) -> Result<(), AccountError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AccountError::EmptyReport);
        }
        let order = self.orders.get_for_user(buyer, order_id, Utc::now()).await?;
        notify::issue_reported(order.id, buyer, message);
        Ok(())
    }
}
