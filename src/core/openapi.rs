use utoipa::{Modify, OpenApi};

use crate::features::shift_reports::{dtos as shift_reports_dtos, handlers as shift_reports_handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Shift reports
        shift_reports_handlers::submit_report,
    ),
    components(
        schemas(
            shift_reports_dtos::SubmitReportDto,
        )
    ),
    tags(
        (name = "shift-reports", description = "Shift report submission, packaging and email delivery"),
    ),
    info(
        title = "Shift Report Service API",
        version = "0.1.0",
        description = "API documentation for the shift report service",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
