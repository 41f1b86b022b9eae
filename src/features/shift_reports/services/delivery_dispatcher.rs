use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::core::error::AppError;
use crate::features::shift_reports::models::ReportRecord;
use crate::modules::mail::{MailError, MailTransport, OutboundMessage};
use crate::shared::validation::sanitize_filename;

/// Fallback used for every empty part of the archive name
const FALLBACK_NAME_PART: &str = "RELATORIO";
const MESSAGE_BODY: &str = "Segue em anexo o relatório em ZIP.";
const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Transport(#[from] MailError),

    #[error("Mail transport did not answer within {0:?}")]
    Timeout(Duration),
}

impl From<DeliveryError> for AppError {
    fn from(err: DeliveryError) -> Self {
        AppError::DeliveryFailed(err.to_string())
    }
}

fn name_part(value: &str) -> String {
    let part = sanitize_filename(&value.to_uppercase());
    if part.is_empty() {
        FALLBACK_NAME_PART.to_string()
    } else {
        part
    }
}

/// `{NAME}-{REGISTRATION}-{DD-MM-YYYY}`, shared by the PDF and the ZIP
pub fn archive_base_name(record: &ReportRecord, submitted_on: NaiveDate) -> String {
    format!(
        "{}-{}-{}",
        name_part(&record.name),
        name_part(&record.registration_id),
        submitted_on.format("%d-%m-%Y")
    )
}

/// Map a packaged report onto the email that carries it
pub fn compose(archive: Vec<u8>, base_name: &str) -> OutboundMessage {
    OutboundMessage {
        subject: format!("RELATÓRIO: {}", base_name),
        body: MESSAGE_BODY.to_string(),
        attachment_name: format!("{}.zip", base_name),
        attachment_content_type: ARCHIVE_CONTENT_TYPE.to_string(),
        attachment: archive,
    }
}

/// Sends packaged reports. One attempt per report, bounded by a timeout.
#[derive(Clone)]
pub struct DeliveryDispatcher {
    transport: Arc<dyn MailTransport>,
    timeout: Duration,
}

impl DeliveryDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub async fn dispatch(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        let attachment_name = message.attachment_name.clone();
        let size = message.attachment.len();

        tokio::time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_| DeliveryError::Timeout(self.timeout))??;

        info!(
            "Report delivered via {}: {} ({} bytes)",
            self.transport.transport_tag(),
            attachment_name,
            size
        );
        Ok(())
    }
}
