//! Order types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aiaxcart_core::{
    CredentialId, CredentialSecret, OrderId, OrderStatus, PaymentMethod, ProductId,
    PurchaseOptions, UserId,
};

/// A customer order.
///
/// Loaded with its stored status. Call [`Order::project`] before handing an
/// order to a reader so delivered orders past expiry read as expired.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub product_name: String,
    #[serde(flatten)]
    pub options: PurchaseOptions,
    /// Total charged, in whole currency units.
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub status: OrderStatus,
    /// Set on delivery.
    pub credential_id: Option<CredentialId>,
    /// Copy of the delivered credential, taken at delivery time.
    pub credential: Option<CredentialSecret>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Replace the stored status with the status a reader sees at `now`.
    #[must_use]
    pub fn project(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.status.project(self.expires_at, now);
        self
    }

    /// Delivered and not yet expired. Only meaningful after [`Order::project`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Delivered
    }

    /// Whether the order was paid for and fulfilled, expired or not.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self.status, OrderStatus::Delivered | OrderStatus::Expired)
    }
}

/// A validated order ready to be inserted as pending.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    pub options: PurchaseOptions,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub created_at: DateTime<Utc>,
}

/// An order with the buyer's contact details, for the back office.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithCustomer {
    #[serde(flatten)]
    pub order: Order,
    /// `Unknown User` when the buyer no longer exists.
    pub user_name: String,
    /// `Unknown Email` when the buyer no longer exists.
    pub user_email: String,
}

impl OrderWithCustomer {
    /// Project the inner order's status.
    #[must_use]
    pub fn project(self, now: DateTime<Utc>) -> Self {
        Self {
            order: self.order.project(now),
            ..self
        }
    }
}
