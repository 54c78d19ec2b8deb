//! Session lifecycle and prediction endpoints
//!
//! A session starts with the user's profile and ends with DELETE; every
//! other per-user endpoint is addressed by its id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use pdscan_common::fusion::{Leaning, ModalityAssessment};
use pdscan_common::{FusionOutcome, Modality, ModalitySet, Verdict};
use serde::Serialize;
use uuid::Uuid;

use chrono::{DateTime, Utc};

use crate::extract::ApiJson;
use crate::session::UserProfile;
use crate::{ApiResult, AppState};

/// Per-modality feedback as shown under each upload
#[derive(Debug, Serialize)]
pub struct AssessmentView {
    pub modality: Modality,
    pub model_name: &'static str,
    /// Raw classifier output in [0,1]
    pub confidence: f64,
    pub leaning: Leaning,
    pub display_confidence: f64,
    pub message: String,
    pub color: &'static str,
}

impl From<&ModalityAssessment> for AssessmentView {
    fn from(a: &ModalityAssessment) -> Self {
        Self {
            modality: a.modality,
            model_name: a.modality.model_name(),
            confidence: a.confidence.value(),
            leaning: a.leaning,
            display_confidence: a.display_confidence,
            message: a.message(),
            color: a.leaning.color(),
        }
    }
}

/// Fused verdict as shown once all three modalities are in
#[derive(Debug, Serialize)]
pub struct OutcomeView {
    pub verdict: Verdict,
    pub label: &'static str,
    pub aggregate_confidence: f64,
    /// Two-decimal rendering, e.g. "88.33"
    pub aggregate_confidence_text: String,
    pub color: &'static str,
    pub headline: String,
}

impl From<FusionOutcome> for OutcomeView {
    fn from(outcome: FusionOutcome) -> Self {
        Self {
            verdict: outcome.verdict,
            label: outcome.verdict.label(),
            aggregate_confidence: outcome.aggregate_confidence,
            aggregate_confidence_text: format!("{:.2}", outcome.aggregate_confidence),
            color: outcome.verdict.color(),
            headline: outcome.headline(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub predictions: Vec<AssessmentView>,
    /// Absent until spiral, MRI and wave results all exist
    pub outcome: Option<OutcomeView>,
    /// Modalities still waiting for an upload
    pub missing: Vec<Modality>,
}

impl From<&ModalitySet> for PredictionResponse {
    fn from(set: &ModalitySet) -> Self {
        Self {
            predictions: set.assessments().iter().map(AssessmentView::from).collect(),
            outcome: set.fuse().map(OutcomeView::from),
            missing: Modality::ALL
                .into_iter()
                .filter(|&m| set.get(m).is_none())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub profile: UserProfile,
    pub report_ready: bool,
    pub faq_visible: bool,
    pub created_at: DateTime<Utc>,
    pub prediction: PredictionResponse,
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    ApiJson(profile): ApiJson<UserProfile>,
) -> ApiResult<(StatusCode, Json<SessionCreated>)> {
    let session_id = state.sessions.create(profile).await?;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    let session = state.sessions.get(id).await?;
    Ok(Json(SessionView {
        session_id: session.id,
        report_ready: session.report_path.is_some(),
        faq_visible: session.faq_visible,
        created_at: session.created_at,
        prediction: PredictionResponse::from(&session.modalities),
        profile: session.profile,
    }))
}

/// PUT /api/sessions/:id/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(profile): ApiJson<UserProfile>,
) -> ApiResult<Json<UserProfile>> {
    profile.validate()?;
    let updated = state
        .sessions
        .update(id, |session| {
            session.profile = profile;
            session.profile.clone()
        })
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/sessions/:id
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.sessions.remove(id).await?;
    state.reports.remove_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:id/prediction
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PredictionResponse>> {
    let session = state.sessions.get(id).await?;
    Ok(Json(PredictionResponse::from(&session.modalities)))
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(end_session))
        .route("/api/sessions/:id/profile", put(update_profile))
        .route("/api/sessions/:id/prediction", get(get_prediction))
        .route(
            "/api/sessions/:id/images/:modality",
            post(super::images::upload_image),
        )
}
