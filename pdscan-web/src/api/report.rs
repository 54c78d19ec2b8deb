//! Report generation, download and email delivery

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::notifier::ReportDelivery;
use crate::report::ReportInput;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ReportGenerated {
    pub filename: String,
    pub download_url: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EmailSent {
    pub recipient: String,
    pub message: String,
}

/// POST /api/sessions/:id/report
///
/// Renders the PDF for the session's fused verdict. Rendering failures are
/// reported to the page and leave the session untouched.
pub async fn generate_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReportGenerated>> {
    let session = state.sessions.get(id).await?;
    let outcome = session.modalities.fuse().ok_or_else(|| {
        ApiError::Conflict(
            "Upload spiral, MRI and wave images before generating a report".to_string(),
        )
    })?;

    let input = ReportInput::now(
        session.profile.name.clone(),
        outcome,
        session.modalities.results(),
    );
    let path = state.reports.render(id, &input).map_err(|e| {
        error!("Report generation failed for session {}: {}", id, e);
        ApiError::Internal(format!("Error generating report: {}", e))
    })?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let attached = match state
        .sessions
        .update(id, |s| s.attach_report(&session.modalities, path))
        .await
    {
        Ok(attached) => attached,
        Err(e) => {
            // Session ended while rendering
            if let Err(cleanup) = state.reports.remove_session(id).await {
                warn!("Failed to remove reports of ended session {}: {}", id, cleanup);
            }
            return Err(e.into());
        }
    };
    if !attached {
        return Err(ApiError::Conflict(
            "Images changed while the report was being generated; generate it again".to_string(),
        ));
    }

    Ok(Json(ReportGenerated {
        download_url: format!("/api/sessions/{}/report", id),
        message: format!("Report generated: {}", filename),
        filename,
    }))
}

/// GET /api/sessions/:id/report
pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let session = state.sessions.get(id).await?;
    let path = session
        .report_path
        .ok_or_else(|| ApiError::NotFound("No report has been generated yet".to_string()))?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::NotFound(format!("Report file {}", path.display()))
        } else {
            ApiError::Io(e)
        }
    })?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report.pdf".to_string());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

/// POST /api/sessions/:id/email
///
/// Sends the generated report to the profile's email address. One attempt
/// only; a failed send is returned to the page.
pub async fn email_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EmailSent>> {
    let notifier = state.notifier.clone().ok_or_else(|| {
        ApiError::ServiceUnavailable(
            "Email delivery is not configured on this server".to_string(),
        )
    })?;

    let session = state.sessions.get(id).await?;
    let report_path = session.report_path.ok_or_else(|| {
        ApiError::Conflict("Generate the report before emailing it".to_string())
    })?;
    if session.profile.email.is_empty() {
        return Err(ApiError::BadRequest(
            "Enter an email address to receive the report".to_string(),
        ));
    }

    let delivery = ReportDelivery {
        recipient: session.profile.email.clone(),
        recipient_name: session.profile.name.clone(),
        report_path,
    };

    notifier.send_report(&delivery).await.map_err(|e| {
        error!("Email delivery failed for session {}: {}", id, e);
        match e {
            pdscan_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Delivery(other.to_string()),
        }
    })?;

    info!("Session {}: report emailed", id);
    Ok(Json(EmailSent {
        message: format!("Report sent to {}", delivery.recipient),
        recipient: delivery.recipient,
    }))
}

/// Build report routes
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/sessions/:id/report",
            post(generate_report).get(download_report),
        )
        .route("/api/sessions/:id/email", post(email_report))
}
