//! Session-stored identity.

use serde::{Deserialize, Serialize};

use aiaxcart_core::{Email, UserId, UserRole};

use super::User;

/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Role at login time.
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether the session belongs to an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
