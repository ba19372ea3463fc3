//! Money amounts in whole currency units.
//!
//! The shop prices everything in whole pesos, so amounts are integers. A
//! [`Price`] pairs such an amount with its currency for display.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A whole-unit amount with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (pesos, not centavos).
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: i64, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// The amount as an exact decimal, for arithmetic.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes the shop can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    PHP,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::PHP => "₱",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PHP" => Ok(Self::PHP),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}
