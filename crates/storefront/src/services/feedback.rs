//! Customer feedback with screenshot attachments.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use crate::db::{FeedbackRepository, RepositoryError};
use crate::models::{CurrentUser, Feedback};

/// Largest accepted decoded image.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Errors from feedback submission.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Please fill in all fields")]
    MissingField,

    #[error("Image must be a base64 data URL")]
    InvalidImage,

    #[error("Image is too large")]
    ImageTooLarge,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Feedback operations.
pub struct FeedbackService<'a> {
    feedback: FeedbackRepository<'a>,
}

impl<'a> FeedbackService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            feedback: FeedbackRepository::new(pool),
        }
    }

    /// Store feedback from a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::MissingField` if the message or image is blank
    /// and `FeedbackError::InvalidImage` if the image isn't an image data URL.
    #[instrument(skip(self, author, message, image), fields(user_id = %author.id))]
    pub async fn submit(
        &self,
        author: &CurrentUser,
        message: &str,
        image: &str,
    ) -> Result<Feedback, FeedbackError> {
        let message = message.trim();
        let image = image.trim();
        if message.is_empty() || image.is_empty() {
            return Err(FeedbackError::MissingField);
        }
        validate_image(image)?;

        let entry = self
            .feedback
            .create(author.id, &author.name, message, image)
            .await?;
        tracing::info!(feedback_id = %entry.id, "Feedback received");
        Ok(entry)
    }

    /// All feedback, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Feedback>, FeedbackError> {
        Ok(self.feedback.list().await?)
    }
}

/// Accept `data:image/<type>;base64,<payload>` with a decodable payload.
fn validate_image(url: &str) -> Result<(), FeedbackError> {
    let (header, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(FeedbackError::InvalidImage)?;

    let subtype = header
        .strip_suffix(";base64")
        .and_then(|mime| mime.strip_prefix("image/"))
        .ok_or(FeedbackError::InvalidImage)?;
    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric() || "+.-".contains(c)) {
        return Err(FeedbackError::InvalidImage);
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| FeedbackError::InvalidImage)?;
    if bytes.is_empty() {
        return Err(FeedbackError::InvalidImage);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(FeedbackError::ImageTooLarge);
    }
    Ok(())
}
