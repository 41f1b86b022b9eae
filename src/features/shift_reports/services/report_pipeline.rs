use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::core::config::ReportConfig;
use crate::core::error::{AppError, Result};
use crate::features::shift_reports::dtos::RawSubmission;
use crate::modules::mail::MailTransport;

use super::archive_packager::ArchivePackager;
use super::delivery_dispatcher::{archive_base_name, compose, DeliveryDispatcher};
use super::document::DocumentRenderer;
use super::normalizer::normalize;

/// Outcome of a delivered submission
#[derive(Debug, Clone)]
pub struct DeliveredReport {
    pub base_name: String,
    pub archive_size: usize,
}

/// Runs one submission through normalize → render → package → dispatch.
///
/// Holds no per-request state; every call owns its record and buffers.
#[derive(Clone)]
pub struct ShiftReportService {
    renderer: DocumentRenderer,
    packager: ArchivePackager,
    dispatcher: DeliveryDispatcher,
    logo_path: PathBuf,
}

fn join_error(stage: &str, err: JoinError) -> AppError {
    AppError::Internal(format!("{} task failed: {}", stage, err))
}

impl ShiftReportService {
    pub fn new(
        report: &ReportConfig,
        transport: Arc<dyn MailTransport>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            renderer: DocumentRenderer::new(report.organization.clone()),
            packager: ArchivePackager::new(report.max_archive_size),
            dispatcher: DeliveryDispatcher::new(transport, send_timeout),
            logo_path: report.logo_path.clone(),
        }
    }

    /// Logo bytes, or `None` when the asset cannot be read
    async fn load_logo(&self) -> Option<Vec<u8>> {
        match tokio::fs::read(&self.logo_path).await {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "Logo not found at {}, rendering without it",
                    self.logo_path.display()
                );
                None
            }
            Err(e) => {
                warn!(
                    "Failed to read logo {}: {}, rendering without it",
                    self.logo_path.display(),
                    e
                );
                None
            }
        }
    }

    pub async fn submit(&self, raw: RawSubmission, submitted_on: NaiveDate) -> Result<DeliveredReport> {
        let record = normalize(raw)?;

        // Attachments alone over the ceiling: reject before rendering.
        // `package` checks again once the document size is known.
        self.packager.preflight(record.attachments_size())?;

        let base_name = archive_base_name(&record, submitted_on);
        info!(
            "Processing report {}: images={}, videos={}, attachment_bytes={}",
            base_name,
            record.images.len(),
            record.videos.len(),
            record.attachments_size()
        );

        let logo = self.load_logo().await;

        let renderer = self.renderer.clone();
        let (record, document) = tokio::task::spawn_blocking(move || {
            let document = renderer.render(&record, logo.as_deref());
            (record, document)
        })
        .await
        .map_err(|e| join_error("Render", e))?;
        let document = document?;
        info!("Rendered {}.pdf ({} bytes)", base_name, document.len());

        let packager = self.packager.clone();
        let archive_name = base_name.clone();
        let archive = tokio::task::spawn_blocking(move || {
            packager.package(&document, &archive_name, &record)
        })
        .await
        .map_err(|e| join_error("Package", e))??;
        let archive_size = archive.len();
        info!("Packaged {}.zip ({} bytes)", base_name, archive_size);

        self.dispatcher.dispatch(compose(archive, &base_name)).await?;

        Ok(DeliveredReport {
            base_name,
            archive_size,
        })
    }
}
