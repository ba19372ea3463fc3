//! Credential stock types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aiaxcart_core::{AccountType, CredentialId, CredentialSecret, CredentialStatus, ProductId};

/// One resold account credential in stock.
#[derive(Debug, Clone, Serialize)]
pub struct Credential {
    pub id: CredentialId,
    pub product_id: ProductId,
    pub account_type: AccountType,
    #[serde(flatten)]
    pub secret: CredentialSecret,
    pub status: CredentialStatus,
    pub created_at: DateTime<Utc>,
}

/// A credential with the name of the product it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialListing {
    #[serde(flatten)]
    pub credential: Credential,
    /// `Unknown` when the product no longer exists.
    pub product_name: String,
}
