use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::AppError;
use crate::features::shift_reports::dtos::{
    RawSubmission, SubmitReportDto, UploadedFile, IMAGES_FIELDS, VIDEOS_FIELDS,
};
use crate::features::shift_reports::services::ShiftReportService;
use crate::shared::constants::{MSG_ARCHIVE_TOO_LARGE, MSG_REPORT_SENT};
use crate::shared::types::ApiResponse;

/// Browsers post file arrays as `images[]`
fn base_field_name(name: &str) -> &str {
    name.strip_suffix("[]").unwrap_or(name)
}

/// A body cut off by the request size limit gets the same answer as an
/// archive over the mail ceiling
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(MSG_ARCHIVE_TOO_LARGE.to_string());
    }
    debug!("{}: {}", context, err);
    AppError::BadRequest(format!("{}: {}", context, err))
}

async fn read_upload(field: Field<'_>) -> Result<UploadedFile, AppError> {
    let file_name = field.file_name().map(|s| s.to_string());

    let data = field
        .bytes()
        .await
        .map_err(|e| multipart_error("Failed to read file data", e))?;

    Ok(UploadedFile {
        file_name,
        data: data.to_vec(),
    })
}

/// An empty file input is posted as a part with no name and no bytes
fn is_empty_upload(file: &UploadedFile) -> bool {
    file.data.is_empty() && file.file_name.as_deref().unwrap_or("").is_empty()
}

/// Submit a shift report
///
/// Accepts multipart/form-data with the report text fields, the JSON-encoded
/// `objects`, `patrols` and `incidents` fields, and any number of `images` and
/// `videos` files. The report is rendered to PDF, zipped with the files and
/// emailed to the configured recipient.
#[utoipa::path(
    post,
    path = "/api/submit",
    tag = "shift-reports",
    request_body(
        content = SubmitReportDto,
        content_type = "multipart/form-data",
        description = "Shift report form with photos and videos",
    ),
    responses(
        (status = 200, description = "Report generated and emailed"),
        (status = 400, description = "Malformed form data, or attachments too large for email"),
        (status = 500, description = "Report could not be generated"),
        (status = 502, description = "Report generated but email delivery failed")
    )
)]
pub async fn submit_report(
    State(service): State<Arc<ShiftReportService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse>, AppError> {
    let mut raw = RawSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart data", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        let name = base_field_name(&field_name);

        if IMAGES_FIELDS.contains(&name) || VIDEOS_FIELDS.contains(&name) {
            let upload = read_upload(field).await?;
            if is_empty_upload(&upload) {
                debug!("Skipping empty file part: {}", field_name);
                continue;
            }

            debug!(
                "Received {} file: {:?} ({} bytes)",
                name,
                upload.file_name,
                upload.data.len()
            );
            if VIDEOS_FIELDS.contains(&name) {
                raw.videos.push(upload);
            } else {
                raw.images.push(upload);
            }
            continue;
        }

        if name.is_empty() {
            debug!("Ignoring unnamed multipart field");
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| multipart_error(&format!("Failed to read field '{}'", name), e))?;
        raw.insert_text(name, text);
    }

    let submitted_on = chrono::Local::now().date_naive();
    let delivered = service.submit(raw, submitted_on).await?;

    info!(
        "Shift report {} sent ({} bytes)",
        delivered.base_name, delivered.archive_size
    );

    Ok(Json(ApiResponse::success(MSG_REPORT_SENT)))
}
