//! 연결 관리 모듈
//!
//! 연결 대상 초기화, 공유 연결의 생명주기, 작업 단위 연결 대여를 처리합니다.
//! 상태는 하나의 `tokio::sync::Mutex` 뒤에 있고, 관리자는 `Arc`로 주입됩니다.

use crate::config::db::ConnectionStringProvider;
use crate::service::db::core::config::{ConnectionConfig, ConnectionPolicy};
use crate::tool::error::AppError;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

/// 데이터베이스 작업을 위한 연결 관리자
pub struct ConnectionManager {
    state: Arc<Mutex<ManagerState>>,
    config: ConnectionConfig,
}

#[derive(Default)]
struct ManagerState {
    /// 초기화된 연결 대상 이름
    target: Option<String>,
    options: Option<MySqlConnectOptions>,
    /// 공유 연결 (Open 상태일 때 Some)
    connection: Option<MySqlConnection>,
}

impl ConnectionManager {
    /// 초기화되지 않은 관리자 생성
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManagerState::default())),
            config,
        }
    }

    pub fn policy(&self) -> ConnectionPolicy {
        self.config.policy
    }

    /// 연결 대상을 초기화합니다.
    ///
    /// 첫 호출만 적용되고, 이후 호출은 경고만 남기고 무시됩니다.
    pub async fn initialize(
        &self,
        target: &str,
        provider: &dyn ConnectionStringProvider,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().await;

        if let Some(existing) = &state.target {
            warn!(
                "연결이 이미 '{}' 대상으로 초기화되어 있어 '{}' 초기화를 무시합니다",
                existing, target
            );
            return Ok(());
        }

        let url = provider.connection_string(target).ok_or_else(|| {
            let err = AppError::Configuration(format!("no connection string for '{target}'"));
            err.log("ConnectionManager::initialize");
            err
        })?;

        let options = MySqlConnectOptions::from_str(&url).map_err(|e| {
            let err =
                AppError::Configuration(format!("invalid connection string for '{target}': {e}"));
            err.log("ConnectionManager::initialize");
            err
        })?;

        state.target = Some(target.to_string());
        state.options = Some(options);
        info!("데이터베이스 연결 대상 초기화: {}", target);
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.options.is_some()
    }

    /// 공유 연결이 열려 있는지
    pub async fn is_open(&self) -> bool {
        self.state.lock().await.connection.is_some()
    }

    pub async fn target(&self) -> Option<String> {
        self.state.lock().await.target.clone()
    }

    /// 공유 연결을 엽니다. 이미 열려 있으면 아무것도 하지 않습니다.
    pub async fn connect(&self) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        if state.connection.is_some() {
            debug!("Connection already open");
            return Ok(());
        }
        let options = state
            .options
            .clone()
            .ok_or_else(|| AppError::NotInitialized("connect() before initialize()".into()))?;

        let conn = self.open(&options).await?;
        state.connection = Some(conn);
        info!("Database connection opened");
        Ok(())
    }

    /// 공유 연결을 닫습니다. 이미 닫혀 있으면 아무것도 하지 않습니다.
    pub async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        match state.connection.take() {
            Some(conn) => {
                if let Err(e) = conn.close().await {
                    warn!("Error while closing connection: {}", e);
                }
                info!("Database connection closed");
            }
            None => debug!("Connection already closed"),
        }
    }

    /// 작업 하나에 쓸 연결을 빌립니다.
    ///
    /// `Shared` 정책에서는 임대가 끝날 때까지 관리자 잠금을 쥐고 공유 연결을 빌려주며,
    /// 닫혀 있으면 엽니다. `PerOperation` 정책에서는 새 연결을 열어 줍니다.
    pub async fn acquire(&self) -> Result<ConnectionLease, AppError> {
        match self.config.policy {
            ConnectionPolicy::Shared => {
                let mut guard = self.state.clone().lock_owned().await;
                let options = guard.options.clone().ok_or_else(|| {
                    AppError::NotInitialized("acquire() before initialize()".into())
                })?;
                if guard.connection.is_none() {
                    guard.connection = Some(self.open(&options).await?);
                    debug!("Shared connection (re)opened on demand");
                }
                Ok(ConnectionLease {
                    inner: LeaseInner::Shared(guard),
                })
            }
            ConnectionPolicy::PerOperation => {
                let options = self.state.lock().await.options.clone().ok_or_else(|| {
                    AppError::NotInitialized("acquire() before initialize()".into())
                })?;
                let conn = self.open(&options).await?;
                Ok(ConnectionLease {
                    inner: LeaseInner::Dedicated(conn),
                })
            }
        }
    }

    /// Perform health check
    pub async fn health_check(&self) -> Result<bool, AppError> {
        let mut lease = self.acquire().await?;
        let result = match lease.connection() {
            Ok(conn) => conn.ping().await.map_err(|e| {
                error!("Database health check failed: {}", e);
                AppError::DatabaseConnection(format!("Health check failed: {}", e))
            }),
            Err(e) => Err(e),
        };
        lease.release().await;
        result?;
        debug!("Database health check passed");
        Ok(true)
    }

    async fn open(&self, options: &MySqlConnectOptions) -> Result<MySqlConnection, AppError> {
        match tokio::time::timeout(self.config.connect_timeout, options.connect()).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => {
                let err = AppError::DatabaseConnection(e.to_string());
                err.log("ConnectionManager::open");
                Err(err)
            }
            Err(_) => {
                let err = AppError::Timeout(format!(
                    "connect timed out after {:?}",
                    self.config.connect_timeout
                ));
                err.log("ConnectionManager::open");
                Err(err)
            }
        }
    }
}

/// 작업 하나 동안 빌린 연결
pub struct ConnectionLease {
    inner: LeaseInner,
}

enum LeaseInner {
    Shared(OwnedMutexGuard<ManagerState>),
    Dedicated(MySqlConnection),
}

impl ConnectionLease {
    pub fn connection(&mut self) -> Result<&mut MySqlConnection, AppError> {
        match &mut self.inner {
            LeaseInner::Shared(guard) => guard
                .connection
                .as_mut()
                .ok_or_else(|| AppError::DatabaseConnection("shared connection is closed".into())),
            LeaseInner::Dedicated(conn) => Ok(conn),
        }
    }

    /// 정상 반납. 전용 연결은 닫고, 공유 연결은 잠금만 풉니다.
    pub async fn release(self) {
        match self.inner {
            LeaseInner::Shared(_guard) => {}
            LeaseInner::Dedicated(conn) => {
                if let Err(e) = conn.close().await {
                    debug!("Error while closing per-operation connection: {}", e);
                }
            }
        }
    }

    /// 상태를 알 수 없게 된 연결(타임아웃 등)을 버립니다.
    ///
    /// 공유 연결이면 다음 `acquire()`에서 다시 엽니다.
    pub async fn invalidate(self) {
        match self.inner {
            LeaseInner::Shared(mut guard) => {
                guard.connection.take();
                warn!("Shared connection discarded");
            }
            LeaseInner::Dedicated(conn) => {
                drop(conn);
                warn!("Per-operation connection discarded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn provider() -> HashMap<String, String> {
        HashMap::from([
            ("localhost".to_string(), "mysql://root:pw@localhost:3306/warehub".to_string()),
            ("other".to_string(), "mysql://root:pw@otherhost:3306/warehub".to_string()),
            ("broken".to_string(), "not a url".to_string()),
        ])
    }

    #[tokio::test]
    async fn test_acquire_before_initialize_fails() {
        let manager = ConnectionManager::new(ConnectionConfig::default());
        assert!(matches!(
            manager.acquire().await,
            Err(AppError::NotInitialized(_))
        ));
        assert!(matches!(
            manager.connect().await,
            Err(AppError::NotInitialized(_))
        ));
    }

    #[tokio::test]
    async fn test_first_initialize_wins() {
        let manager = ConnectionManager::new(ConnectionConfig::default());
        manager.initialize("localhost", &provider()).await.unwrap();
        manager.initialize("other", &provider()).await.unwrap();
        assert_eq!(manager.target().await.as_deref(), Some("localhost"));
        assert!(manager.is_initialized().await);
    }

    #[tokio::test]
    async fn test_initialize_missing_or_invalid_target() {
        let manager = ConnectionManager::new(ConnectionConfig::default());
        assert!(matches!(
            manager.initialize("nowhere", &provider()).await,
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            manager.initialize("broken", &provider()).await,
            Err(AppError::Configuration(_))
        ));
        // 실패한 초기화는 상태를 남기지 않음
        assert!(!manager.is_initialized().await);
        manager.initialize("localhost", &provider()).await.unwrap();
        assert_eq!(manager.target().await.as_deref(), Some("localhost"));
    }

    #[tokio::test]
    async fn test_disconnect_when_closed_is_noop() {
        let manager = ConnectionManager::new(ConnectionConfig::default());
        manager.disconnect().await;
        manager.disconnect().await;
        assert!(!manager.is_open().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_initialize_has_single_winner() {
        const TASKS: usize = 16;

        let targets: HashMap<String, String> = (0..TASKS)
            .map(|i| {
                (
                    format!("target{i}"),
                    format!("mysql://root:pw@host{i}:3306/warehub"),
                )
            })
            .collect();
        let provider = Arc::new(targets);
        let manager = Arc::new(ConnectionManager::new(ConnectionConfig::default()));

        let handles: Vec<_> = (0..TASKS)
            .map(|i| {
                let manager = manager.clone();
                let provider = provider.clone();
                tokio::spawn(async move {
                    manager
                        .initialize(&format!("target{i}"), &*provider)
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        // 승자 하나만 남고 나머지 호출은 상태를 바꾸지 않음
        let winner = manager.target().await.unwrap();
        assert!(provider.contains_key(&winner));
        assert!(manager.is_initialized().await);
        assert!(!manager.is_open().await);

        manager.initialize("target0", &*provider).await.unwrap();
        assert_eq!(manager.target().await, Some(winner));
    }
}
