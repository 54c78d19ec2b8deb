//! Append-only feedback log

use chrono::Local;
use pdscan_common::{Error, Result};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, Clone)]
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append `"{timestamp}: {text}\n"`
    pub async fn append(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Feedback cannot be empty".to_string()));
        }

        let line = format!(
            "{}: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
            text
        );

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        info!("Feedback recorded ({} chars)", text.chars().count());
        Ok(())
    }
}
