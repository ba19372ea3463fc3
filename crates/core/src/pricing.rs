//! Checkout pricing rules.
//!
//! `total = round((base + account surcharge + profile surcharge) * duration multiplier)`
//!
//! Arithmetic is exact decimal; rounding is half-up, matching what customers
//! have always been quoted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AccountType, PlanDuration, ProfileType, PurchaseOptions};

/// Surcharge for the account type, in whole currency units.
#[must_use]
pub const fn account_type_surcharge(account_type: AccountType) -> i64 {
    match account_type {
        AccountType::Shared => 0,
        AccountType::Solo => 100,
    }
}

/// Surcharge for the profile type, in whole currency units.
#[must_use]
pub const fn profile_type_surcharge(profile_type: ProfileType) -> i64 {
    match profile_type {
        ProfileType::Account => 0,
        ProfileType::Profile => 50,
    }
}

/// Price multiplier for a duration.
#[must_use]
pub fn duration_multiplier(duration: PlanDuration) -> Decimal {
    match duration {
        PlanDuration::SevenDays => Decimal::ONE,
        PlanDuration::FourteenDays => Decimal::new(12, 1),
        PlanDuration::OneMonth => Decimal::new(15, 1),
        PlanDuration::ThreeMonths => Decimal::TWO,
        PlanDuration::SixMonths => Decimal::from(3),
        PlanDuration::TwelveMonths => Decimal::from(5),
    }
}

/// Round half-up: `floor(x + 0.5)`.
fn round_half_up(value: Decimal) -> Decimal {
    (value + Decimal::new(5, 1)).floor()
}

/// Compute the order total for a base price and option set.
///
/// Totals outside the `i64` range saturate; no catalog price comes near it.
#[must_use]
pub fn calculate_total(base_price: i64, options: &PurchaseOptions) -> i64 {
    let subtotal = Decimal::from(base_price)
        + Decimal::from(account_type_surcharge(options.account_type))
        + Decimal::from(profile_type_surcharge(options.profile_type));

    let total = round_half_up(subtotal * duration_multiplier(options.duration));

    i64::try_from(total).unwrap_or(if total.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Itemized price quote, returned to the checkout form before ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Product base price.
    pub base_price: i64,
    /// Account type surcharge.
    pub account_type_surcharge: i64,
    /// Profile type surcharge.
    pub profile_type_surcharge: i64,
    /// Duration multiplier applied to the subtotal.
    pub multiplier: Decimal,
    /// Rounded total.
    pub total: i64,
}

impl Quote {
    /// Build the itemized quote for a base price and option set.
    #[must_use]
    pub fn new(base_price: i64, options: &PurchaseOptions) -> Self {
        Self {
            base_price,
            account_type_surcharge: account_type_surcharge(options.account_type),
            profile_type_surcharge: profile_type_surcharge(options.profile_type),
            multiplier: duration_multiplier(options.duration),
            total: calculate_total(base_price, options),
        }
    }
}
