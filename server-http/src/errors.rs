use crate::models::{ChaosErrorResponse, ErrorResponse};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use shared::Error;
use std::any::Any;
use tracing::error;

pub const CHAOS_ERROR_CODE: &str = "FEATURE_FLAG_CHAOS";

/// A cart error paired with the generic message used if it turns into a 500.
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    context: &'static str,
}

impl ApiError {
    pub fn new(error: Error, context: &'static str) -> Self {
        Self { error, context }
    }

    pub fn from_rejection(rejection: JsonRejection, context: &'static str) -> Self {
        Self::new(Error::BadRequest(rejection.body_text()), context)
    }
}

pub trait ApiResultExt<T> {
    fn or_api_error(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> ApiResultExt<T> for shared::Result<T> {
    fn or_api_error(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::new(e, context))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.error {
            Error::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(reason))).into_response()
            }
            not_found @ (Error::CartNotFound | Error::ItemNotFound) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(not_found.to_string())),
            )
                .into_response(),
            Error::ChaosInjected { retry_after_ms } => {
                let retry_after_secs = retry_after_ms.div_ceil(1000).max(1);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(header::RETRY_AFTER, retry_after_secs.to_string())],
                    Json(ChaosErrorResponse {
                        error: "Cart service temporarily unavailable".to_string(),
                        code: CHAOS_ERROR_CODE.to_string(),
                        retry_after: retry_after_ms,
                    }),
                )
                    .into_response()
            }
            other => {
                error!("❌ {}: {}", self.context, other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(self.context).with_message(other.to_string())),
                )
                    .into_response()
            }
        }
    }
}

/// Last-resort handler: a panicking request becomes a 500 instead of a dropped connection.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!("❌ Error: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error").with_message(message)),
    )
        .into_response()
}
