//! Outbound email
//!
//! The portal only sends one kind of email (password reset). Delivery goes
//! through the [`Mailer`] trait: [`LogMailer`] writes to the log,
//! [`MemoryMailer`] keeps an outbox for tests and `BrevoMailer` (feature
//! `email`) calls the Brevo transactional email API.

#[cfg(feature = "email")]
mod brevo;
mod templates;

#[cfg(feature = "email")]
pub use brevo::BrevoMailer;
pub use templates::{ResetEmail, render_reset_email};

use async_trait::async_trait;
use std::sync::Mutex;

use crate::core::error::PortalError;

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("failed to render email template: {0}")]
    Template(#[from] tera::Error),

    #[error("email provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("email transport failed: {0}")]
    Transport(String),
}

impl From<MailError> for PortalError {
    fn from(err: MailError) -> Self {
        PortalError::Integration(err.to_string())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Logs every email instead of sending it
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to_email,
            subject = %email.subject,
            "email delivery disabled, logging instead"
        );
        tracing::debug!(html = %email.html, "email body");
        Ok(())
    }
}

/// Keeps sent emails in memory
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<OutgoingEmail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.outbox
            .lock()
            .map_err(|e| MailError::Transport(e.to_string()))?
            .push(email);
        Ok(())
    }
}
