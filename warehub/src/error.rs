//! REST API 에러 타입
//!
//! shared::tool::error::AppError를 HTTP 응답으로 바꿉니다.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::tool::error::AppError;
use thiserror::Error;

/// API 에러 타입
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.error_code(),
            "message": self.to_string(),
        }))
    }
}

// AppError에서 변환
impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidInput(msg)
            | AppError::MissingField(msg)
            | AppError::InvalidFormat(msg) => ApiError::ValidationError(msg),
            AppError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// 편의를 위한 타입 별칭
pub type ApiResult<T> = Result<T, ApiError>;
