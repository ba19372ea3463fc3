//! Status and role enums for store records.
//!
//! Every enum here is persisted as its `snake_case` string form, so the
//! `Display`/`FromStr` pair and the serde representation always agree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Define a fieldless enum stored as a lower-case string.
///
/// Generates `as_str()`, `ALL`, `Display` and `FromStr` (with a `String`
/// error naming the offending value).
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The persisted string form.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!("invalid {}: {s}", $label)),
                }
            }
        }
    };
}

string_enum! {
    /// Whether a product is offered in the storefront.
    pub enum ProductStatus: "product status" {
        Active => "active",
        Inactive => "inactive",
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        Self::Active
    }
}

string_enum! {
    /// Lifecycle of a credential in stock.
    ///
    /// Moves `Available` -> `Sold` exactly once, when an order is delivered.
    pub enum CredentialStatus: "credential status" {
        Available => "available",
        Sold => "sold",
    }
}

string_enum! {
    /// Order status as seen by readers.
    ///
    /// Only `Pending` and `Delivered` are ever persisted. `Expired` is a
    /// projection computed by [`OrderStatus::project`] on every read.
    pub enum OrderStatus: "order status" {
        Pending => "pending",
        Delivered => "delivered",
        Expired => "expired",
    }
}

impl OrderStatus {
    /// Project a stored status onto the status a reader should see at `now`.
    ///
    /// An order whose `expires_at` lies strictly before `now` reads as
    /// `Expired`, whatever was stored. Otherwise the stored status is returned
    /// unchanged.
    #[must_use]
    pub fn project(self, expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match expires_at {
            Some(expiry) if expiry < now => Self::Expired,
            _ => self,
        }
    }

    /// Whether this status may be written to the orders table.
    #[must_use]
    pub const fn is_storable(self) -> bool {
        matches!(self, Self::Pending | Self::Delivered)
    }
}

string_enum! {
    /// Platform role of a user account.
    pub enum UserRole: "user role" {
        /// Regular customer.
        User => "user",
        /// Back-office operator.
        Admin => "admin",
    }
}

/// Aggregate view of a user's standing, used by account summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OrderCounts {
    /// Orders still waiting for delivery.
    pub pending: u64,
    /// Delivered orders that have not expired.
    pub active: u64,
    /// Delivered orders past their expiry.
    pub expired: u64,
}

impl OrderCounts {
    /// Tally one projected status.
    pub const fn record(&mut self, status: OrderStatus) {
        match status {
            OrderStatus::Pending => self.pending += 1,
            OrderStatus::Delivered => self.active += 1,
            OrderStatus::Expired => self.expired += 1,
        }
    }

    /// Total number of orders tallied.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pending + self.active + self.expired
    }
}
