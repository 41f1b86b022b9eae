//! SMTP mail transport
//!
//! Sends through an authenticated relay using lettre's tokio transport.
//! Port 465 uses implicit TLS; any other port upgrades with STARTTLS.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use super::{MailError, MailTransport, OutboundMessage};
use crate::core::config::MailConfig;

const IMPLICIT_TLS_PORT: u16 = 465;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, MailError> {
    let parsed = address.trim().parse().map_err(|e| MailError::Address {
        address: address.to_string(),
        reason: format!("{}", e),
    })?;
    Ok(Mailbox::new(name.map(str::to_string), parsed))
}

impl SmtpMailer {
    /// Create the SMTP transport from configuration.
    ///
    /// Addresses are validated here so a bad configuration fails at startup
    /// rather than on the first submission.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let from = mailbox(Some(config.from_name.as_str()), &config.from_address)?;
        let to = mailbox(None, &config.recipient)?;

        let builder = if config.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .timeout(Some(config.send_timeout))
            .build();

        info!(
            "SMTP transport configured for {}:{} (recipient: {})",
            config.smtp_host, config.smtp_port, config.recipient
        );

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    /// MIME message: plain-text body plus the attachment
    pub fn build_message(&self, message: OutboundMessage) -> Result<Message, MailError> {
        let content_type = ContentType::parse(&message.attachment_content_type)
            .map_err(|e| MailError::Build(e.to_string()))?;

        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(message.body))
                    .singlepart(
                        Attachment::new(message.attachment_name)
                            .body(message.attachment, content_type),
                    ),
            )
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn transport_tag(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), MailError> {
        let email = self.build_message(message)?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        debug!("SMTP server response: {:?}", response.code());
        Ok(())
    }
}
