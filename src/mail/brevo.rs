use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{MailError, Mailer, OutgoingEmail};

const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Serialize)]
struct Contact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    sender: Contact<'a>,
    to: Vec<Contact<'a>>,
    subject: &'a str,
    html_content: &'a str,
}

/// Sends email through Brevo's transactional API
#[derive(Clone)]
pub struct BrevoMailer {
    client: Client,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoMailer {
    pub fn new(
        api_key: impl Into<String>,
        sender_email: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            sender_email: sender_email.into(),
            sender_name: sender_name.into(),
        }
    }
}

impl std::fmt::Debug for BrevoMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrevoMailer")
            .field("sender_email", &self.sender_email)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let payload = SendRequest {
            sender: Contact {
                email: &self.sender_email,
                name: Some(&self.sender_name),
            },
            to: vec![Contact {
                email: &email.to_email,
                name: email.to_name.as_deref(),
            }],
            subject: &email.subject,
            html_content: &email.html,
        };

        let response = self
            .client
            .post(BREVO_ENDPOINT)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %email.to_email, "email sent via Brevo");
        Ok(())
    }
}
