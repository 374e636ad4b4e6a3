//! 데이터베이스 서비스 설정 모듈
//!
//! 빌더 패턴으로 데이터베이스 서비스 설정을 관리

use crate::service::db::core::transaction::IsolationLevel;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// 데이터베이스 서비스 설정
#[derive(Debug, Clone, Default)]
pub struct DbServiceConfig {
    /// 쿼리 실행 설정
    pub query_config: QueryConfig,

    /// 연결 설정
    pub connection_config: ConnectionConfig,
}

/// 쿼리 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// 쿼리 로깅 활성화
    pub enable_query_logging: bool,

    /// 느린 쿼리 로깅 (임계값: ms)
    pub slow_query_threshold_ms: u64,

    /// 문장 실행 타임아웃
    pub statement_timeout: Duration,

    /// 트랜잭션 격리 수준 (None이면 서버 기본값)
    pub isolation_level: Option<IsolationLevel>,
}

/// 연결 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionPolicy {
    /// 작업마다 짧게 쓰고 닫는 전용 연결
    #[default]
    PerOperation,
    /// 하나의 공유 연결, 작업 단위로 직렬화
    Shared,
}

impl FromStr for ConnectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_operation" | "per-operation" => Ok(ConnectionPolicy::PerOperation),
            "shared" => Ok(ConnectionPolicy::Shared),
            other => Err(format!("unknown connection policy: {other}")),
        }
    }
}

/// 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub policy: ConnectionPolicy,

    /// 연결 타임아웃
    pub connect_timeout: Duration,
}

impl DbServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 환경변수에서 설정 로드
    ///
    /// 잘못된 값은 경고를 남기고 기본값을 사용합니다.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = env_parse::<u64>("DB_STATEMENT_TIMEOUT_SECS") {
            config.query_config.statement_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = env_parse::<u64>("DB_SLOW_QUERY_MS") {
            config.query_config.slow_query_threshold_ms = ms;
        }
        if let Ok(val) = std::env::var("DB_QUERY_LOGGING") {
            config.query_config.enable_query_logging = val.to_lowercase() == "true";
        }
        if let Some(level) = env_parse::<IsolationLevel>("DB_ISOLATION_LEVEL") {
            config.query_config.isolation_level = Some(level);
        }
        if let Some(policy) = env_parse::<ConnectionPolicy>("DB_CONNECTION_POLICY") {
            config.connection_config.policy = policy;
        }
        if let Some(secs) = env_parse::<u64>("DB_CONNECT_TIMEOUT_SECS") {
            config.connection_config.connect_timeout = Duration::from_secs(secs);
        }

        config
    }

    /// Builder method for query configuration
    pub fn with_query_config(mut self, config: QueryConfig) -> Self {
        self.query_config = config;
        self
    }

    /// Builder method for connection configuration
    pub fn with_connection_config(mut self, config: ConnectionConfig) -> Self {
        self.connection_config = config;
        self
    }

    pub fn with_policy(mut self, policy: ConnectionPolicy) -> Self {
        self.connection_config.policy = policy;
        self
    }

    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.query_config.statement_timeout = timeout;
        self
    }
}

fn env_parse<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} 값이 잘못되어 기본값을 사용합니다: {} ({})", key, raw, e);
            None
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            enable_query_logging: true,
            slow_query_threshold_ms: 1000,
            statement_timeout: Duration::from_secs(30),
            isolation_level: None,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            policy: ConnectionPolicy::PerOperation,
            connect_timeout: Duration::from_secs(10),
        }
    }
}
