//! FAQ, resource links and feedback

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use pdscan_common::content::{Faq, ResourceLink, FAQS, HELPFUL_RESOURCES, TELEMEDICINE_LINK};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::ApiJson;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct FaqToggle {
    pub visible: bool,
    /// Present only while the FAQ is shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faqs: Option<&'static [Faq]>,
}

#[derive(Debug, Serialize)]
pub struct Resources {
    pub telemedicine: ResourceLink,
    pub helpful: &'static [ResourceLink],
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackAccepted {
    pub message: &'static str,
}

/// GET /api/faq
pub async fn list_faqs() -> Json<&'static [Faq]> {
    Json(&FAQS[..])
}

/// POST /api/sessions/:id/faq/toggle
pub async fn toggle_faq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FaqToggle>> {
    let visible = state
        .sessions
        .update(id, |s| {
            s.faq_visible = !s.faq_visible;
            s.faq_visible
        })
        .await?;

    Ok(Json(FaqToggle {
        visible,
        faqs: visible.then_some(&FAQS[..]),
    }))
}

/// GET /api/resources
pub async fn list_resources() -> Json<Resources> {
    Json(Resources {
        telemedicine: TELEMEDICINE_LINK,
        helpful: &HELPFUL_RESOURCES[..],
    })
}

/// POST /api/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FeedbackRequest>,
) -> ApiResult<Json<FeedbackAccepted>> {
    state.feedback.append(&request.text).await?;
    Ok(Json(FeedbackAccepted {
        message: "Thank you for your feedback!",
    }))
}

pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/api/faq", get(list_faqs))
        .route("/api/sessions/:id/faq/toggle", post(toggle_faq))
        .route("/api/resources", get(list_resources))
        .route("/api/feedback", post(submit_feedback))
}
