//! Purchase options a customer picks at checkout.

use crate::string_enum;

string_enum! {
    /// Whether a credential is shared between buyers or sold to one.
    pub enum AccountType: "account type" {
        /// Sold to several simultaneous buyers.
        Shared => "shared",
        /// Sold exclusively to one buyer.
        Solo => "solo",
    }
}

impl AccountType {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Shared => "Shared",
            Self::Solo => "Solo",
        }
    }
}

string_enum! {
    /// Whether the buyer gets the whole account or a single profile on it.
    pub enum ProfileType: "profile type" {
        Account => "account",
        Profile => "profile",
    }
}

impl ProfileType {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Profile => "Profile",
        }
    }
}

string_enum! {
    /// Purchased access period, written as the duration codes shown at checkout.
    pub enum PlanDuration: "duration" {
        SevenDays => "7d",
        FourteenDays => "14d",
        OneMonth => "1m",
        ThreeMonths => "3m",
        SixMonths => "6m",
        TwelveMonths => "12m",
    }
}

impl PlanDuration {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SevenDays => "7 Days",
            Self::FourteenDays => "14 Days",
            Self::OneMonth => "1 Month",
            Self::ThreeMonths => "3 Months",
            Self::SixMonths => "6 Months",
            Self::TwelveMonths => "12 Months",
        }
    }
}

string_enum! {
    /// How the customer paid. Payments are confirmed by hand before delivery.
    pub enum PaymentMethod: "payment method" {
        Gcash => "gcash",
        Maya => "maya",
        Bank => "bank",
    }
}

impl PaymentMethod {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Gcash => "GCash",
            Self::Maya => "Maya",
            Self::Bank => "Bank Transfer",
        }
    }
}

/// The option set chosen for one purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PurchaseOptions {
    /// Shared or solo credential.
    pub account_type: AccountType,
    /// Whole account or a single profile.
    pub profile_type: ProfileType,
    /// Access period.
    pub duration: PlanDuration,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_codes() {
        let codes: Vec<&str> = PlanDuration::ALL.iter().map(PlanDuration::as_str).collect();
        assert_eq!(codes, ["7d", "14d", "1m", "3m", "6m", "12m"]);
        assert_eq!("3m".parse::<PlanDuration>(), Ok(PlanDuration::ThreeMonths));
        assert!("30d".parse::<PlanDuration>().is_err());
    }

    #[test]
    fn test_purchase_options_deserialize_from_codes() {
        let options: PurchaseOptions = serde_json::from_str(
            r#"{"account_type":"solo","profile_type":"profile","duration":"12m"}"#,
        )
        .unwrap();
        assert_eq!(options.account_type, AccountType::Solo);
        assert_eq!(options.profile_type, ProfileType::Profile);
        assert_eq!(options.duration, PlanDuration::TwelveMonths);
    }

    #[test]
    fn test_labels() {
        assert_eq!(PaymentMethod::Bank.label(), "Bank Transfer");
        assert_eq!(PlanDuration::OneMonth.label(), "1 Month");
    }
}
