use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::shift_reports::handlers::submit_report;
use crate::features::shift_reports::services::ShiftReportService;

/// Create routes for the shift reports feature
pub fn routes(service: Arc<ShiftReportService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/submit",
            // Photos and videos arrive in the same request body
            post(submit_report).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .with_state(service)
}
