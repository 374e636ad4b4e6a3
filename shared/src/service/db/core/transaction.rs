//! Transaction management module
//!
//! 단일 문장 트랜잭션의 시작, 커밋, 롤백을 담당합니다.
//! 영향받은 행이 하나 이상일 때만 커밋하고, 그렇지 않으면 롤백합니다.

use crate::tool::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::{Connection, MySql, MySqlConnection, Transaction};
use std::str::FromStr;
use tracing::{debug, error, info, warn};

/// Transaction manager for single-statement units of work
#[derive(Debug, Clone, Default)]
pub struct TransactionManager {
    isolation_level: Option<IsolationLevel>,
}

impl TransactionManager {
    pub fn new(isolation_level: Option<IsolationLevel>) -> Self {
        Self { isolation_level }
    }

    /// 트랜잭션 시작
    ///
    /// 격리 수준이 설정되어 있으면 BEGIN 직전에 다음 트랜잭션에 적용합니다.
    pub async fn begin<'c>(
        &self,
        conn: &'c mut MySqlConnection,
    ) -> Result<Transaction<'c, MySql>, AppError> {
        if let Some(level) = self.isolation_level {
            let isolation_sql = format!("SET TRANSACTION ISOLATION LEVEL {}", level.as_str());
            sqlx::query(&isolation_sql)
                .execute(&mut *conn)
                .await
                .map_err(|e| {
                    AppError::TransactionFailed(format!("Failed to set isolation level: {}", e))
                })?;
            debug!("Transaction isolation level set to {:?}", level);
        }

        let tx = conn.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::TransactionFailed(format!("Transaction start failed: {}", e))
        })?;

        debug!("Transaction started");
        Ok(tx)
    }

    /// 영향받은 행 수에 따라 커밋 또는 롤백합니다.
    ///
    /// 커밋하면 `Ok(true)`, 0행이라 롤백하면 `Ok(false)`.
    pub async fn settle(
        &self,
        tx: Transaction<'_, MySql>,
        affected_rows: u64,
        label: &str,
    ) -> Result<bool, AppError> {
        if should_commit(affected_rows) {
            self.commit(tx).await?;
            info!("{} ({} row(s) affected)", label, affected_rows);
            Ok(true)
        } else {
            warn!("{}: no rows affected, rolling back", label);
            self.rollback(tx).await;
            Ok(false)
        }
    }

    pub async fn commit(&self, tx: Transaction<'_, MySql>) -> Result<(), AppError> {
        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::TransactionFailed(format!("Transaction commit failed: {}", e))
        })?;
        debug!("Transaction committed");
        Ok(())
    }

    /// 롤백. 롤백 자체의 실패는 로그만 남깁니다.
    pub async fn rollback(&self, tx: Transaction<'_, MySql>) {
        match tx.rollback().await {
            Ok(()) => debug!("Transaction rolled back"),
            Err(e) => error!("Failed to rollback transaction: {}", e),
        }
    }
}

/// 단일 문장 트랜잭션의 커밋 조건
pub fn should_commit(affected_rows: u64) -> bool {
    affected_rows >= 1
}

/// Transaction isolation levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

impl FromStr for IsolationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "READ UNCOMMITTED" => Ok(IsolationLevel::ReadUncommitted),
            "READ COMMITTED" => Ok(IsolationLevel::ReadCommitted),
            "REPEATABLE READ" => Ok(IsolationLevel::RepeatableRead),
            "SERIALIZABLE" => Ok(IsolationLevel::Serializable),
            _ => Err(format!("unknown isolation level: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolation_level_string() {
        assert_eq!(IsolationLevel::ReadCommitted.as_str(), "READ COMMITTED");
        assert_eq!(IsolationLevel::Serializable.as_str(), "SERIALIZABLE");
    }

    #[test]
    fn test_isolation_level_parse() {
        assert_eq!(
            "read_committed".parse::<IsolationLevel>(),
            Ok(IsolationLevel::ReadCommitted)
        );
        assert_eq!(
            "REPEATABLE READ".parse::<IsolationLevel>(),
            Ok(IsolationLevel::RepeatableRead)
        );
        assert!("snapshot".parse::<IsolationLevel>().is_err());
    }

    #[test]
    fn test_commit_only_when_rows_affected() {
        assert!(!should_commit(0));
        assert!(should_commit(1));
        assert!(should_commit(42));
    }
}
