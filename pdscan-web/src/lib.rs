//! pdscan-web library interface
//!
//! Screening service: upload spiral, MRI and wave images, classify each,
//! fuse the three confidences into one verdict, render and email a report.

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod extract;
pub mod feedback;
pub mod notifier;
pub mod preprocess;
pub mod report;
pub mod session;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use classifier::ClassifierSet;
use feedback::FeedbackLog;
use notifier::Notifier;
use pdscan_common::config::RootFolderInitializer;
use report::ReportRenderer;
use session::SessionStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Largest accepted request body (image uploads)
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// One classifier per modality
    pub classifiers: ClassifierSet,
    /// Per-browser session state
    pub sessions: SessionStore,
    /// Writes PDFs under `<root>/reports`
    pub reports: ReportRenderer,
    /// `<root>/feedback.txt`
    pub feedback: FeedbackLog,
    /// `None` when SMTP credentials are not configured
    pub notifier: Option<Arc<dyn Notifier>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(classifiers: ClassifierSet, root: &RootFolderInitializer) -> Self {
        Self {
            classifiers,
            sessions: SessionStore::new(),
            reports: ReportRenderer::new(root.reports_dir()),
            feedback: FeedbackLog::new(root.feedback_path()),
            notifier: None,
            startup_time: Utc::now(),
        }
    }

    /// Enable email delivery
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI routes (HTML page and script)
        .merge(api::ui_routes())
        // API routes
        .merge(api::session_routes())
        .merge(api::report_routes())
        .merge(api::content_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
