//! 식별자(UUID) 생성 유틸리티

use crate::tool::error::AppError;
use tracing::{trace, warn};
use uuid::Uuid;

/// UUID 생성 / 문자열 변환 / 파싱 헬퍼
pub struct IdGenerator;

impl IdGenerator {
    /// 새 v4 UUID를 생성합니다.
    pub fn generate() -> Uuid {
        let id = Uuid::new_v4();
        trace!("새 ID 생성: {}", id);
        id
    }

    /// UUID를 DB에 저장되는 형태(하이픈 포함 소문자)로 변환합니다.
    pub fn to_db_string(id: &Uuid) -> String {
        id.hyphenated().to_string()
    }

    /// 문자열을 UUID로 파싱합니다.
    pub fn parse(value: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(value.trim()).map_err(|e| {
            warn!("잘못된 ID 형식: {} ({})", value, e);
            AppError::InvalidFormat(format!("invalid id '{value}': {e}"))
        })
    }
}
