//! Outbound mail
//!
//! The report pipeline talks to a [`MailTransport`]; production uses SMTP,
//! tests plug in a recording fake.

mod smtp_client;

use async_trait::async_trait;
use thiserror::Error;

pub use smtp_client::SmtpMailer;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// One email with a single binary attachment
#[derive(Clone)]
pub struct OutboundMessage {
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub attachment_content_type: String,
    pub attachment: Vec<u8>,
}

impl std::fmt::Debug for OutboundMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundMessage")
            .field("subject", &self.subject)
            .field("attachment_name", &self.attachment_name)
            .field("attachment_size", &self.attachment.len())
            .finish()
    }
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Short name used in logs
    fn transport_tag(&self) -> &'static str;

    /// Deliver the message once. Returns after the server accepted it.
    async fn send(&self, message: OutboundMessage) -> Result<(), MailError>;
}
