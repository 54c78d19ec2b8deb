//! pdscan-web - Parkinson's disease screening service
//!
//! Serves the upload page, classifies spiral/MRI/wave images, fuses the three
//! results and renders/emails the PDF report.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pdscan_common::config::{
    default_config_path, load_toml_config, resolve_root_folder, RootFolderInitializer, TomlConfig,
    DEFAULT_PORT, ROOT_FOLDER_ENV,
};
use pdscan_common::Error as CommonError;
use pdscan_web::classifier::ClassifierSet;
use pdscan_web::config::{resolve_model_paths, resolve_smtp_settings};
use pdscan_web::notifier::SmtpNotifier;
use pdscan_web::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for pdscan-web
#[derive(Parser, Debug)]
#[command(name = "pdscan-web")]
#[command(about = "Parkinson's disease screening service")]
#[command(version)]
struct Args {
    /// Root folder for models, reports and feedback (else PDSCAN_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PDSCAN_PORT")]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long, env = "PDSCAN_CONFIG")]
    config: Option<PathBuf>,
}

/// Missing file is not fatal; a broken file is
fn load_config(path: Option<PathBuf>) -> Result<TomlConfig> {
    let Some(path) = path.or_else(default_config_path) else {
        return Ok(TomlConfig::default());
    };

    match load_toml_config(&path) {
        Ok(config) => Ok(config),
        Err(CommonError::NotFound(msg)) => {
            // Subscriber is not up yet
            eprintln!("warning: {} (using defaults)", msg);
            Ok(TomlConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("Invalid config file {}", path.display())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.clone())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting pdscan-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, &config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;
    info!("Root folder: {}", initializer.root().display());

    let model_paths = resolve_model_paths(&config.models, &initializer.models_dir());
    info!(
        "Models: spiral={}, mri={}, wave={}",
        model_paths.spiral.display(),
        model_paths.mri.display(),
        model_paths.wave.display()
    );
    let classifiers = match ClassifierSet::load_onnx(&model_paths) {
        Ok(set) => {
            info!("✓ Loaded spiral, MRI and wave models");
            set
        }
        Err(e) => {
            error!("Failed to load models: {}", e);
            return Err(e.into());
        }
    };

    let mut state = AppState::new(classifiers, &initializer);
    match resolve_smtp_settings(config.smtp.as_ref()) {
        Some(settings) => {
            state = state.with_notifier(Arc::new(SmtpNotifier::new(settings)));
        }
        None => warn!("SMTP credentials not configured; emailing reports is disabled"),
    }

    let app = build_router(state);

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("pdscan-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
