//! 애플리케이션 에러 관리
//!
//! 데이터 접근 계층과 서비스 계층에서 발생하는 모든 에러를 하나의 타입으로 모읍니다.
//! 심각도에 따라 로깅 레벨을 고르고, sqlx 에러를 도메인 에러로 변환합니다.

use thiserror::Error;
use tracing::{error, info, warn};

/// 공통 애플리케이션 에러 정의
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    // 입력값 검증 에러
    #[error("입력값 오류: {0}")]
    InvalidInput(String),

    #[error("필수 필드 누락: {0}")]
    MissingField(String),

    #[error("잘못된 형식: {0}")]
    InvalidFormat(String),

    // 설정 / 초기화 에러
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("연결이 초기화되지 않았습니다: {0}")]
    NotInitialized(String),

    // 타입 레지스트리 / 값 변환 에러
    #[error("등록되지 않은 테이블: {0}")]
    UnknownTable(String),

    #[error("값 변환 실패: {0}")]
    Conversion(String),

    // 데이터베이스 관련 에러
    #[error("데이터베이스 연결 실패: {0}")]
    DatabaseConnection(String),

    #[error("데이터베이스 쿼리 실패: {0}")]
    DatabaseQuery(String),

    #[error("트랜잭션 실패: {0}")]
    TransactionFailed(String),

    #[error("중복된 데이터: {0}")]
    DuplicateEntry(String),

    // 시스템 에러
    #[error("내부 서버 에러: {0}")]
    InternalError(String),

    #[error("타임아웃: {0}")]
    Timeout(String),

    #[error("Not Found: {0}")]
    NotFound(String),
}

impl AppError {
    /// 에러의 심각도를 반환합니다.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Critical: 시스템 장애
            AppError::DatabaseConnection(_)
            | AppError::Configuration(_)
            | AppError::NotInitialized(_) => ErrorSeverity::Critical,

            // High: 데이터 작업 실패
            AppError::DatabaseQuery(_)
            | AppError::TransactionFailed(_)
            | AppError::DuplicateEntry(_)
            | AppError::Conversion(_)
            | AppError::Timeout(_)
            | AppError::InternalError(_) => ErrorSeverity::High,

            // Medium: 호출자 입력 오류
            AppError::InvalidInput(_)
            | AppError::MissingField(_)
            | AppError::InvalidFormat(_)
            | AppError::UnknownTable(_) => ErrorSeverity::Medium,

            AppError::NotFound(_) => ErrorSeverity::Low,
        }
    }

    /// 에러를 로깅합니다.
    ///
    /// 심각도에 따라 적절한 로깅 레벨을 사용합니다.
    pub fn log(&self, context: &str) {
        let error_msg = self.to_string();

        match self.severity() {
            ErrorSeverity::Critical => {
                error!("[CRITICAL] {} - {}", context, error_msg);
            }
            ErrorSeverity::High => {
                error!("[HIGH] {} - {}", context, error_msg);
            }
            ErrorSeverity::Medium => {
                warn!("[MEDIUM] {} - {}", context, error_msg);
            }
            ErrorSeverity::Low => {
                info!("[LOW] {} - {}", context, error_msg);
            }
        }
    }
}

/// 에러 심각도 레벨
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorSeverity {
    Critical, // 시스템 장애
    High,     // 데이터 작업 실패
    Medium,   // 입력 오류
    Low,      // 일반적인 경고
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let is_duplicate = db_err
                    .code()
                    .map(|code| code == "23000" || code.starts_with("1062"))
                    .unwrap_or(false);
                if is_duplicate {
                    // MySQL duplicate entry error
                    AppError::DuplicateEntry(db_err.to_string())
                } else {
                    AppError::DatabaseQuery(db_err.to_string())
                }
            }
            sqlx::Error::PoolTimedOut => {
                AppError::Timeout("Database connection timeout".to_string())
            }
            sqlx::Error::Io(e) => AppError::DatabaseConnection(e.to_string()),
            sqlx::Error::Tls(e) => AppError::DatabaseConnection(e.to_string()),
            sqlx::Error::Configuration(e) => AppError::Configuration(e.to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                AppError::Conversion(format!("column {index}: {source}"))
            }
            _ => AppError::DatabaseQuery(err.to_string()),
        }
    }
}

/// 에러 처리 헬퍼 함수들
pub mod helpers {
    use super::*;

    /// sqlx 에러를 컨텍스트와 함께 AppError로 변환합니다.
    pub fn map_sqlx_error(err: sqlx::Error, context: &str) -> AppError {
        match AppError::from(err) {
            AppError::DatabaseQuery(msg) => AppError::DatabaseQuery(format!("{context}: {msg}")),
            AppError::DatabaseConnection(msg) => {
                AppError::DatabaseConnection(format!("{context}: {msg}"))
            }
            other => other,
        }
    }

    /// 문자열 검증 헬퍼 함수
    ///
    /// 빈 문자열(공백만 있는 경우 포함)은 `MissingField`로 거부합니다.
    pub fn validate_string(
        value: &str,
        field_name: &str,
        max_length: usize,
    ) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Err(AppError::MissingField(field_name.to_string()));
        }

        if value.chars().count() > max_length {
            return Err(AppError::InvalidInput(format!(
                "{field_name} too long (max: {max_length})"
            )));
        }

        Ok(())
    }
}
