//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aiaxcart_core::{Email, UserId, UserRole};

/// A registered customer or back-office admin.
///
/// The password hash never leaves the repository, so this type is safe to
/// return from API handlers.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: Email,
    /// Platform role.
    pub role: UserRole,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user may use the back office.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
