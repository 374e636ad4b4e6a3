//! 애플리케이션 조립
//!
//! 설정 → 연결 관리자 → 실행기 → CRUD 서비스 → 상품 서비스 순서로 의존성을 만듭니다.

use crate::api::product_api::configure_product_routes;
use crate::repository::product_repository::ProductRepository;
use crate::service::product_service::ProductService;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use shared::config::AppSettings;
use shared::service::db::{
    ConnectionManager, ConnectionPolicy, CrudService, CrudServiceImpl, DbServiceConfig,
    QueryExecutor, TableRegistry,
};
use std::sync::Arc;
use tracing::{info, warn};

/// HTTP 서버와 연결 대상 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `appsettings.{profile}.json`의 profile
    pub profile: String,
    /// ConnectionStrings 항목 이름
    pub db_target: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            profile: "dev".to_string(),
            db_target: "localhost".to_string(),
        }
    }
}

impl AppConfig {
    /// 환경변수에서 설정 로드 (`http_host`, `http_port`, `WAREHUB_PROFILE`, `DB_TARGET`)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("http_host") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("http_port") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("잘못된 http_port '{}', 기본값 {} 사용", port, config.port),
            }
        }
        if let Ok(profile) = std::env::var("WAREHUB_PROFILE") {
            config.profile = profile;
        }
        if let Ok(target) = std::env::var("DB_TARGET") {
            config.db_target = target;
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 조립된 애플리케이션
pub struct WarehubApp {
    pub config: AppConfig,
    connection: Arc<ConnectionManager>,
    product_service: ProductService,
}

impl WarehubApp {
    /// 데이터베이스 연결까지 확인한 애플리케이션을 만듭니다.
    pub async fn bootstrap(config: AppConfig) -> Result<Self> {
        let settings = AppSettings::load(&config.profile).context("설정 파일 로드 실패")?;
        let db_config = DbServiceConfig::from_env();

        let connection = Arc::new(ConnectionManager::new(db_config.connection_config.clone()));
        connection
            .initialize(&config.db_target, &settings)
            .await
            .context("데이터베이스 연결 초기화 실패")?;

        match connection.policy() {
            ConnectionPolicy::Shared => connection
                .connect()
                .await
                .context("데이터베이스 연결 실패")?,
            ConnectionPolicy::PerOperation => {
                connection
                    .health_check()
                    .await
                    .context("데이터베이스 상태 확인 실패")?;
            }
        }
        info!(
            "데이터베이스 준비 완료: target={}, policy={:?}",
            config.db_target,
            connection.policy()
        );

        let executor = Arc::new(QueryExecutor::new(
            connection.clone(),
            db_config.query_config.clone(),
        ));
        let crud: Arc<dyn CrudService> = Arc::new(CrudServiceImpl::new(
            executor,
            Arc::new(TableRegistry::default()),
        ));
        let product_service = ProductService::new(ProductRepository::new(crud));

        Ok(Self {
            config,
            connection,
            product_service,
        })
    }

    pub fn product_service(&self) -> &ProductService {
        &self.product_service
    }

    /// Ctrl+C 또는 서버 종료까지 HTTP 서버를 실행합니다.
    pub async fn run_http_server(&self) -> Result<()> {
        let addr = self.config.bind_address();
        let service = web::Data::new(self.product_service.clone());

        info!("Warehub API server listening on {}", addr);

        HttpServer::new(move || {
            App::new()
                .app_data(service.clone())
                .wrap(middleware::Logger::default())
                .configure(configure_product_routes)
        })
        .bind(&addr)
        .map_err(|e| {
            tracing::error!("Failed to bind API server to {}: {}", addr, e);
            e
        })?
        .run()
        .await
        .context("API 서버 실행 실패")?;

        Ok(())
    }

    /// 공유 연결을 닫습니다.
    pub async fn shutdown(&self) {
        self.connection.disconnect().await;
        info!("데이터베이스 연결 종료");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.profile, "dev");
        assert_eq!(config.db_target, "localhost");
    }
}
