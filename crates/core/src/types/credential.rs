//! Secret fields of a resold account credential.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Login details handed to a buyer on delivery.
///
/// Buyers must be shown these values, so they are kept as entered. `Debug`
/// output never prints them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSecret {
    /// Login name or email of the resold account.
    pub login: String,
    /// Account password.
    pub password: String,
    /// Profile name, for profile-level sales.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Profile PIN, when the service uses one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
}

impl CredentialSecret {
    /// Whether the mandatory fields are filled in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.login.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSecret")
            .field("login", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .field("profile", &self.profile.as_ref().map(|_| "[REDACTED]"))
            .field("pin", &self.pin.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
