//! Report delivery by email
//!
//! `SmtpNotifier` sends over STARTTLS with credentials resolved from the
//! environment or TOML config. Failures are reported once; there is no retry.

use crate::config::SmtpSettings;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pdscan_common::{Error, Result};
use std::path::PathBuf;
use tracing::{error, info};

pub const REPORT_SUBJECT: &str = "Your Parkinson's Disease Detection Report";

/// One report to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDelivery {
    pub recipient: String,
    /// Name used in the greeting
    pub recipient_name: String,
    pub report_path: PathBuf,
}

impl ReportDelivery {
    pub fn body(&self) -> String {
        format!(
            "Dear {},\n\nPlease find attached your Parkinson's Disease detection report.\n\nBest regards,\nYour Healthcare Team",
            self.recipient_name
        )
    }

    fn attachment_name(&self) -> String {
        self.report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.pdf".to_string())
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_report(&self, delivery: &ReportDelivery) -> Result<()>;
}

pub struct SmtpNotifier {
    settings: SmtpSettings,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    /// Assemble the message: plain-text body plus PDF attachment
    pub fn build_message(&self, delivery: &ReportDelivery, pdf: Vec<u8>) -> Result<Message> {
        let from: Mailbox = self
            .settings
            .sender
            .parse()
            .map_err(|e| Error::Config(format!("Invalid sender address: {}", e)))?;
        let to: Mailbox = delivery
            .recipient
            .parse()
            .map_err(|e| Error::InvalidInput(format!("Invalid recipient address: {}", e)))?;
        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| Error::Internal(format!("Bad content type: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(REPORT_SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(delivery.body()))
                    .singlepart(Attachment::new(delivery.attachment_name()).body(pdf, pdf_type)),
            )
            .map_err(|e| Error::Notify(format!("Failed to build message: {}", e)))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials =
            Credentials::new(self.settings.username.clone(), self.settings.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.server)
            .map_err(|e| Error::Notify(format!("Invalid SMTP relay: {}", e)))?
            .port(self.settings.port)
            .credentials(credentials)
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_report(&self, delivery: &ReportDelivery) -> Result<()> {
        let pdf = tokio::fs::read(&delivery.report_path).await?;
        let message = self.build_message(delivery, pdf)?;

        match self.transport()?.send(message).await {
            Ok(_) => {
                info!(
                    "Report {} emailed to {}",
                    delivery.report_path.display(),
                    delivery.recipient
                );
                Ok(())
            }
            Err(e) => {
                error!("Error sending email to {}: {}", delivery.recipient, e);
                Err(Error::Notify(format!("Error sending email: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> SmtpNotifier {
        SmtpNotifier::new(SmtpSettings {
            server: "smtp.example.com".to_string(),
            port: 587,
            username: "reports@example.com".to_string(),
            password: "secret".to_string(),
            sender: "reports@example.com".to_string(),
        })
    }

    fn delivery(recipient: &str) -> ReportDelivery {
        ReportDelivery {
            recipient: recipient.to_string(),
            recipient_name: "Ada".to_string(),
            report_path: PathBuf::from("/tmp/reports/Parkinsons_Disease_Report_Ada.pdf"),
        }
    }

    #[test]
    fn test_message_has_subject_body_and_attachment() {
        let message = notifier()
            .build_message(&delivery("ada@example.com"), b"%PDF-1.5 test".to_vec())
            .unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();

        assert!(raw.contains("Subject: Your Parkinson's Disease Detection Report"));
        assert!(raw.contains("To: ada@example.com"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("Parkinsons_Disease_Report_Ada.pdf"));
        assert!(raw.contains("Dear Ada,"));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let result = notifier().build_message(&delivery("not-an-address"), Vec::new());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_body_greets_by_name() {
        let body = delivery("ada@example.com").body();
        assert!(body.starts_with("Dear Ada,\n\n"));
        assert!(body.ends_with("Your Healthcare Team"));
    }

    #[tokio::test]
    async fn test_missing_report_file_is_io_error() {
        let mut d = delivery("ada@example.com");
        d.report_path = PathBuf::from("/nonexistent/report.pdf");
        let result = notifier().send_report(&d).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
