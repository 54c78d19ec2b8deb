//! HTTP API handlers for pdscan-web

pub mod content;
pub mod health;
pub mod images;
pub mod report;
pub mod sessions;
pub mod ui;

pub use content::content_routes;
pub use health::health_routes;
pub use report::report_routes;
pub use sessions::session_routes;
pub use ui::ui_routes;
