//! 통합 로깅 시스템
//!
//! `tracing` + `tracing-subscriber` 기반의 로깅 초기화를 제공합니다.
//!
//! # 사용 예시
//! ```no_run
//! use shared::logging::{init_logging, ServiceType};
//!
//! init_logging(ServiceType::ApiServer);
//! tracing::info!("서버 시작");
//! ```

pub mod config;

pub use config::{LoggingConfig, ServiceType};

use tracing_subscriber::EnvFilter;

/// 로깅 시스템 초기화 함수
///
/// `RUST_LOG`가 있으면 그것을, 없으면 `LOG_LEVEL`(기본 info)을 필터로 사용합니다.
/// 이미 전역 subscriber가 설치되어 있으면 아무것도 하지 않습니다.
pub fn init_logging(service_type: ServiceType) {
    let mut config = LoggingConfig::from_env();
    if let Err(e) = config.validate() {
        eprintln!("잘못된 로깅 설정, 기본값 사용: {e}");
        config = LoggingConfig::default();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(config.show_target);

    let installed = if config.json_format {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::info!("로깅 초기화 완료: {}", service_type.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging(ServiceType::Shared);
        init_logging(ServiceType::Shared);
    }
}
