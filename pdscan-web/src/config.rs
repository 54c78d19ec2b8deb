//! Configuration resolution for pdscan-web
//!
//! SMTP settings resolve with ENV → TOML priority and are never compiled
//! in. Model paths resolve TOML → `<root>/models/<modality>.onnx`.

use pdscan_common::config::{ModelsConfig, SmtpConfig, DEFAULT_SMTP_PORT, DEFAULT_SMTP_SERVER};
use pdscan_common::Modality;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SMTP_SERVER_ENV: &str = "PDSCAN_SMTP_SERVER";
pub const SMTP_USER_ENV: &str = "PDSCAN_SMTP_USER";
pub const SMTP_PASSWORD_ENV: &str = "PDSCAN_SMTP_PASSWORD";
pub const SMTP_SENDER_ENV: &str = "PDSCAN_SMTP_SENDER";
pub const SMTP_PORT_ENV: &str = "PDSCAN_SMTP_PORT";

/// Fully resolved SMTP relay settings
#[derive(Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .finish()
    }
}

/// Resolve SMTP settings from environment and TOML
///
/// **Priority:** ENV → TOML → built-in relay defaults (server/port only)
///
/// Returns `None` when no username or password is available; email
/// delivery is then disabled rather than failing startup.
pub fn resolve_smtp_settings(toml_smtp: Option<&SmtpConfig>) -> Option<SmtpSettings> {
    let env_value = |name: &str| {
        std::env::var(name)
            .ok()
            .filter(|v| is_valid_value(v))
    };

    let env_password = env_value(SMTP_PASSWORD_ENV);
    let toml_password = toml_smtp
        .and_then(|s| s.password.clone())
        .filter(|v| is_valid_value(v));

    if env_password.is_some() && toml_password.is_some() {
        warn!(
            "SMTP password found in both {} and TOML config. Using environment (highest priority).",
            SMTP_PASSWORD_ENV
        );
    }

    let username = env_value(SMTP_USER_ENV).or_else(|| {
        toml_smtp
            .and_then(|s| s.username.clone())
            .filter(|v| is_valid_value(v))
    });
    let password = env_password.or(toml_password);

    let (username, password) = match (username, password) {
        (Some(u), Some(p)) => (u, p),
        _ => return None,
    };

    let server = env_value(SMTP_SERVER_ENV)
        .or_else(|| toml_smtp.map(|s| s.server.clone()))
        .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string());
    let port = env_port()
        .or_else(|| toml_smtp.map(|s| s.port))
        .unwrap_or(DEFAULT_SMTP_PORT);
    let sender = env_value(SMTP_SENDER_ENV)
        .or_else(|| toml_smtp.and_then(|s| s.sender.clone()))
        .unwrap_or_else(|| username.clone());

    info!("SMTP relay configured: {}:{} as {}", server, port, username);

    Some(SmtpSettings {
        server,
        port,
        username,
        password,
        sender,
    })
}

/// `PDSCAN_SMTP_PORT`, ignored with a warning when it is not a port number
fn env_port() -> Option<u16> {
    let raw = std::env::var(SMTP_PORT_ENV).ok().filter(|v| is_valid_value(v))?;
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Some(port),
        _ => {
            warn!("Ignoring {}={:?}: not a valid port", SMTP_PORT_ENV, raw);
            None
        }
    }
}

/// Non-empty, non-whitespace
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Model artifact location for each modality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub spiral: PathBuf,
    pub mri: PathBuf,
    pub wave: PathBuf,
}

impl ModelPaths {
    pub fn for_modality(&self, modality: Modality) -> &Path {
        match modality {
            Modality::Spiral => &self.spiral,
            Modality::Mri => &self.mri,
            Modality::Wave => &self.wave,
        }
    }
}

/// Resolve model paths; relative TOML entries are joined onto `models_dir`
pub fn resolve_model_paths(models: &ModelsConfig, models_dir: &Path) -> ModelPaths {
    let pick = |configured: &Option<PathBuf>, modality: Modality| match configured {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => models_dir.join(path),
        None => models_dir.join(format!("{}.onnx", modality.as_str())),
    };

    ModelPaths {
        spiral: pick(&models.spiral, Modality::Spiral),
        mri: pick(&models.mri, Modality::Mri),
        wave: pick(&models.wave, Modality::Wave),
    }
}
