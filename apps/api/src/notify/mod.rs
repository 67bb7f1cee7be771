//! Notifier: composes candidate/admin emails and hands them to a `MailTransport`.
//!
//! Delivery is fire-and-forget relative to persistence: `notify` never returns
//! an error. Failures come back as a `DeliveryReport` that callers turn into a
//! warning on their response.

pub mod resend;
pub mod templates;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub use resend::ResendMailer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAck {
    pub message_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("cannot read attachment '{}': {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outbound delivery: one message per call.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutgoingEmail) -> Result<DeliveryAck, MailError>;
}

/// An attachment to be read from disk at send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSource {
    pub filename: String,
    pub path: PathBuf,
}

impl MailError {
    pub fn failure(&self) -> DeliveryFailure {
        match self {
            MailError::Http(_) => DeliveryFailure::Transport,
            MailError::Rejected { .. } => DeliveryFailure::Rejected,
            MailError::Attachment { .. } => DeliveryFailure::AttachmentUnavailable,
        }
    }
}

/// Public failure class. The underlying `MailError` is logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    AttachmentUnavailable,
    Rejected,
    Transport,
}

impl DeliveryFailure {
    pub fn message(self) -> &'static str {
        match self {
            DeliveryFailure::AttachmentUnavailable => {
                "The email was not sent because an attachment is unavailable."
            }
            DeliveryFailure::Rejected => "The email provider rejected the message.",
            DeliveryFailure::Transport => "The email provider could not be reached.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub failure: Option<DeliveryFailure>,
}

/// A notification that did not go out, reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationWarning {
    pub kind: &'static str,
    pub recipient: String,
    pub subject: String,
    pub message: &'static str,
}

impl DeliveryReport {
    pub fn into_warning(self, recipient: &str, subject: &str) -> Option<NotificationWarning> {
        let failure = self.failure?;
        Some(NotificationWarning {
            kind: "NOTIFICATION_ERROR",
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            message: failure.message(),
        })
    }
}

#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    pub async fn notify(
        &self,
        recipient: &str,
        subject: &str,
        html: String,
        attachments: &[AttachmentSource],
    ) -> DeliveryReport {
        match self.deliver(recipient, subject, html, attachments).await {
            Ok(ack) => {
                info!(
                    recipient,
                    subject,
                    message_id = ack.message_id.as_deref().unwrap_or("-"),
                    "Email sent"
                );
                DeliveryReport { failure: None }
            }
            Err(e) => {
                warn!(recipient, subject, error = %e, "Email not delivered");
                DeliveryReport {
                    failure: Some(e.failure()),
                }
            }
        }
    }

    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        html: String,
        attachments: &[AttachmentSource],
    ) -> Result<DeliveryAck, MailError> {
        let mut loaded = Vec::with_capacity(attachments.len());
        for source in attachments {
            let content = tokio::fs::read(&source.path)
                .await
                .map_err(|e| MailError::Attachment {
                    path: source.path.clone(),
                    source: e,
                })?;
            loaded.push(EmailAttachment {
                filename: source.filename.clone(),
                content,
            });
        }

        let message = OutgoingEmail {
            to: recipient.to_string(),
            subject: subject.to_string(),
            html,
            attachments: loaded,
        };
        self.transport.send(&message).await
    }
}
