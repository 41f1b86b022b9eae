mod layout;
mod metrics;
mod pdf;

use thiserror::Error;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::shift_reports::models::ReportRecord;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Invalid logo image: {0}")]
    Logo(#[from] image::ImageError),

    #[error("Failed to write PDF: {0}")]
    Write(String),
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Renders a [`ReportRecord`] into a paginated PDF
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    organization: String,
}

impl DocumentRenderer {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }

    /// Render the whole document. Output depends only on the record and the
    /// logo, so rendering twice yields identical bytes.
    pub fn render(&self, record: &ReportRecord, logo: Option<&[u8]>) -> Result<Vec<u8>, RenderError> {
        let logo = match logo {
            Some(bytes) => {
                let decoded = image::load_from_memory(bytes)?.to_rgb8();
                Some(pdf::RgbImage {
                    width: decoded.width(),
                    height: decoded.height(),
                    pixels: decoded.into_raw(),
                })
            }
            None => None,
        };

        let document = layout::layout(
            record,
            &self.organization,
            logo.as_ref().map(|image| (image.width, image.height)),
        );
        let bytes = pdf::write_pdf(&document, logo.as_ref())?;

        debug!(
            "Rendered report: pages={}, bytes={}",
            document.pages.len(),
            bytes.len()
        );

        Ok(bytes)
    }
}
