//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is never fatal; callers log a warning and continue
//! with defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "PDSCAN_ROOT_FOLDER";

/// Default HTTP port for pdscan-web
pub const DEFAULT_PORT: u16 = 5730;

/// Default SMTP relay (STARTTLS)
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional so a partial file still loads.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Root folder for models, reports and the feedback log
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-modality model artifact paths
    #[serde(default)]
    pub models: ModelsConfig,

    /// Outbound mail relay. Credentials may also come from the environment.
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Model artifact overrides; relative paths resolve against the root folder
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub spiral: Option<PathBuf>,
    #[serde(default)]
    pub mri: Option<PathBuf>,
    #[serde(default)]
    pub wave: Option<PathBuf>,
}

/// SMTP relay section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_server")]
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// From address; defaults to the username
    #[serde(default)]
    pub sender: Option<String>,
}

fn default_smtp_server() -> String {
    DEFAULT_SMTP_SERVER.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

/// Get default configuration file path for the platform
///
/// `~/.config/pdscan/pdscan.toml` on Linux, the platform config directory
/// elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdscan").join("pdscan.toml"))
}

/// Load and parse a TOML configuration file
///
/// # Errors
/// - `NotFound` if the file does not exist
/// - `Config` if it cannot be read or parsed
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve the root folder following the priority order above
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        info!("Root folder from command line: {}", path.display());
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            info!("Root folder from {}: {}", env_var_name, path);
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.root_folder {
        info!("Root folder from TOML config: {}", path.display());
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    let path = default_root_folder();
    info!("Root folder from compiled default: {}", path.display());
    path
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/pdscan
        dirs::data_local_dir()
            .map(|d| d.join("pdscan"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/pdscan"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/pdscan
        dirs::data_dir()
            .map(|d| d.join("pdscan"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/pdscan"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\pdscan
        dirs::data_local_dir()
            .map(|d| d.join("pdscan"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\pdscan"))
    } else {
        PathBuf::from("./pdscan_data")
    }
}

/// Creates the root folder layout and names the files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root folder with its `reports/` and `models/` subdirectories if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.reports_dir())?;
        std::fs::create_dir_all(self.models_dir())?;
        Ok(())
    }

    /// Directory holding rendered PDF reports
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    /// Directory searched for model artifacts without explicit paths
    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    /// Append-only feedback log
    pub fn feedback_path(&self) -> PathBuf {
        self.root.join("feedback.txt")
    }
}
