//! Domain types shared by every Aiaxcart crate.

pub mod credential;
pub mod email;
pub mod id;
pub mod options;
pub mod price;
pub mod status;

pub use credential::CredentialSecret;
pub use email::{Email, EmailError};
pub use id::*;
pub use options::{AccountType, PaymentMethod, PlanDuration, ProfileType, PurchaseOptions};
pub use price::{CurrencyCode, Price};
pub use status::*;
