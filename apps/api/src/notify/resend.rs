//! Resend transport (https://resend.com/docs/api-reference/emails/send-email).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DeliveryAck, MailError, MailTransport, OutgoingEmail};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<SendAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct SendAttachment<'a> {
    filename: &'a str,
    /// Base64 file content.
    content: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: String,
}

#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_key: String,
    from: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Result<Self, MailError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            api_key,
            from,
            endpoint: RESEND_API_URL.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl MailTransport for ResendMailer {
    async fn send(&self, message: &OutgoingEmail) -> Result<DeliveryAck, MailError> {
        let body = SendRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            attachments: message
                .attachments
                .iter()
                .map(|a| SendAttachment {
                    filename: &a.filename,
                    content: STANDARD.encode(&a.content),
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ResendError>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SendResponse = response.json().await?;
        Ok(DeliveryAck {
            message_id: parsed.id,
        })
    }
}
