use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The packaged archive does not fit the email transport ceiling
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// The report was built but the mail transport could not deliver it
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge(ref msg) => {
                tracing::warn!("Rejected oversized submission: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro ao gerar o relatório".to_string(),
                )
            }
            AppError::DeliveryFailed(ref msg) => {
                tracing::error!("Delivery error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Relatório gerado, mas não foi possível enviá-lo por e-mail".to_string(),
                )
            }
        };

        let body = Json(ApiResponse::error(message));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
