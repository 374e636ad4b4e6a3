//! 로깅 설정 관리
//!
//! 로깅 시스템의 설정 파라미터와 서비스 타입 정의를 담당합니다.

use serde::{Deserialize, Serialize};

/// 서비스 타입 열거형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    /// REST API 서버
    ApiServer,
    /// 상품 데이터 적재 도구
    Populator,
    /// 공유 라이브러리
    Shared,
}

impl ServiceType {
    /// 서비스 타입을 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ApiServer => "warehub-api",
            ServiceType::Populator => "warehub-populator",
            ServiceType::Shared => "shared",
        }
    }
}

/// 로깅 시스템 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 기본 로그 레벨 (RUST_LOG가 없을 때, 기본값: info)
    pub level: String,

    /// ANSI 색상 사용 여부 (기본값: true)
    pub ansi: bool,

    /// 로그에 target(모듈 경로) 표시 여부 (기본값: false)
    pub show_target: bool,

    /// JSON 형식 여부 (기본값: false)
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
            show_target: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LOG_LEVEL") {
            config.level = val.to_lowercase();
        }

        if let Ok(val) = std::env::var("LOG_ANSI") {
            config.ansi = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("LOG_SHOW_TARGET") {
            config.show_target = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("LOG_JSON_FORMAT") {
            config.json_format = val.to_lowercase() == "true";
        }

        config
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
            other => Err(anyhow::anyhow!("unknown log level: {}", other)),
        }
    }
}
