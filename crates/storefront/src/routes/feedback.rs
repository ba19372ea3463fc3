//! Feedback route handlers.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Feedback;
use crate::services::FeedbackService;
use crate::state::AppState;

/// Request bodies carry a base64 screenshot.
const FEEDBACK_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Build the feedback router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feedback", get(list).post(submit))
        .layer(DefaultBodyLimit::max(FEEDBACK_BODY_LIMIT))
}

/// Feedback body.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub message: String,
    /// `data:image/...;base64,` URL.
    pub image: String,
}

/// All feedback, oldest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Feedback>>> {
    Ok(Json(FeedbackService::new(state.pool()).list().await?))
}

/// Submit feedback.
pub async fn submit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>)> {
    let entry = FeedbackService::new(state.pool())
        .submit(&user, &request.message, &request.image)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use super::*;
    use crate::routes::testing::{TestApp, app};

    #[tokio::test]
    async fn test_submit_and_list_feedback() {
        let TestApp { router, .. } = app().await;
        let cookie = router.register("Ana", "ana@shop.ph").await;

        let response = router
            .call(
                Method::POST,
                "/api/feedback",
                Some(&cookie),
                Some(json!({ "message": "Fast!", "image": "data:image/gif;base64,R0lGODlh" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.json["user_name"], "Ana");

        let response = router
            .call(
                Method::POST,
                "/api/feedback",
                Some(&cookie),
                Some(json!({ "message": "Fast!", "image": "not an image" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);

        let response = router.call(Method::GET, "/api/feedback", None, None).await;
        assert_eq!(response.json.as_array().unwrap().len(), 1);
    }
}
