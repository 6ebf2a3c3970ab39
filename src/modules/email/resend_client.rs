use serde::{Deserialize, Serialize};

use crate::core::config::EmailConfig;

/// One outgoing HTML email
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

/// Response from the Resend send endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailResponse {
    pub id: String,
}

/// Minimal client for `POST /emails` on the Resend API
pub struct ResendClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl ResendClient {
    pub fn new(api_key: String, config: &EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            from: config.from.clone(),
        }
    }

    /// Send one email, returning the provider's message id
    pub async fn send(&self, message: &EmailMessage) -> Result<SendEmailResponse, EmailError> {
        if message.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        let body = SendEmailRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::SendError(format!(
                "Email request failed: HTTP {} - {}",
                status, body
            )));
        }

        let sent: SendEmailResponse = response
            .json()
            .await
            .map_err(|e| EmailError::ParseError(e.to_string()))?;

        tracing::debug!("Sent email '{}' (id: {})", message.subject, sent.id);

        Ok(sent)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email has no recipients")]
    NoRecipients,

    #[error("Failed to send email: {0}")]
    SendError(String),

    #[error("Failed to parse email response: {0}")]
    ParseError(String),
}
