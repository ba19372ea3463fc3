//! Shop notifications.
//!
//! Notifications are structured log events on the `notifications` target, so
//! they can be routed to a separate sink with an `EnvFilter` directive such as
//! `notifications=info`.

use aiaxcart_core::{OrderId, Price};

use crate::models::{CurrentUser, Order};

/// Tell the back office a new order is waiting for payment confirmation.
pub fn order_placed(order: &Order, buyer: &CurrentUser, price: Price) {
    tracing::info!(
        target: "notifications",
        audience = "admin",
        order_id = %order.id,
        buyer = %buyer.email,
        product = %order.product_name,
        account_type = order.options.account_type.label(),
        profile_type = order.options.profile_type.label(),
        duration = order.options.duration.label(),
        payment_method = order.payment_method.label(),
        payment_reference = %order.payment_reference,
        total = %price,
        "New order #{} from {}: {} ({}) for {}",
        order.id,
        buyer.name,
        order.product_name,
        order.options.duration.label(),
        price,
    );
}

/// Tell the buyer their account has been delivered.
pub fn order_delivered(order: &Order) {
    tracing::info!(
        target: "notifications",
        audience = "user",
        user_id = %order.user_id,
        order_id = %order.id,
        product = %order.product_name,
        expires_at = ?order.expires_at,
        "Your {} account has been delivered! Check your orders for the login details.",
        order.product_name,
    );
}

/// Tell the back office a buyer reported a problem with an order.
pub fn issue_reported(order_id: OrderId, reporter: &CurrentUser, message: &str) {
    tracing::info!(
        target: "notifications",
        audience = "admin",
        order_id = %order_id,
        reporter = %reporter.email,
        issue = message,
        "Issue reported on order #{} by {}",
        order_id,
        reporter.name,
    );
}
