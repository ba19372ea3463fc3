//! Customer feedback.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aiaxcart_core::{FeedbackId, UserId};

/// A feedback entry with its screenshot.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub user_id: UserId,
    /// Name of the user at submission time.
    pub user_name: String,
    pub message: String,
    /// `data:image/...;base64,` URL.
    pub image: String,
    pub created_at: DateTime<Utc>,
}
