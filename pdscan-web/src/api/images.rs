//! Image upload and classification

use axum::extract::{Multipart, Path, State};
use axum::Json;
use pdscan_common::fusion::{assess, ModalityResult};
use pdscan_common::Modality;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::sessions::{AssessmentView, PredictionResponse};
use crate::{preprocess, ApiError, ApiResult, AppState};

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Feedback for the image just uploaded
    pub prediction: AssessmentView,
    /// Everything known so far, including the fused outcome when complete
    pub session: PredictionResponse,
}

/// POST /api/sessions/:id/images/:modality
///
/// Decodes and preprocesses the `image` field, runs the modality's
/// classifier and records the result. Re-uploading replaces the earlier
/// result and invalidates any generated report.
pub async fn upload_image(
    State(state): State<AppState>,
    Path((id, modality)): Path<(Uuid, String)>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let modality: Modality = modality.parse()?;

    // Fail fast on unknown sessions before reading the body
    state.sessions.get(id).await?;

    let mut image_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?;
            image_bytes = Some(bytes);
        }
    }
    let image_bytes = image_bytes.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart field '{}'", IMAGE_FIELD))
    })?;

    let tensor = preprocess::preprocess_bytes(&image_bytes).map_err(|e| {
        warn!("Rejected {} upload for session {}: {}", modality, id, e);
        e
    })?;

    info!("Analyzing image for {}", modality.model_name());
    let confidence = state.classifiers.classify(modality, &tensor)?;
    let result = ModalityResult { modality, confidence };
    let assessment = assess(result);
    info!("Session {}: {}", id, assessment.message());

    let set = state
        .sessions
        .update(id, |session| {
            session.modalities.record(result);
            session.report_path = None;
            session.modalities.clone()
        })
        .await?;

    if let Some(outcome) = set.fuse() {
        info!(
            "Session {}: final prediction {} ({:.2}%)",
            id, outcome.verdict, outcome.aggregate_confidence
        );
    }

    Ok(Json(UploadResponse {
        prediction: AssessmentView::from(&assessment),
        session: PredictionResponse::from(&set),
    }))
}
