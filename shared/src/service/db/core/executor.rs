//! 쿼리 실행 모듈
//!
//! 파라미터 바인딩, 트랜잭션 안에서의 실행, 결과 행 변환을 담당

use crate::service::db::core::config::QueryConfig;
use crate::service::db::core::connection::{ConnectionLease, ConnectionManager};
use crate::service::db::core::convert::convert_value;
use crate::service::db::core::statement::NamedStatement;
use crate::service::db::core::transaction::TransactionManager;
use crate::service::db::core::types::{ColumnTypeMap, DbValue, QueryParams, QueryRow};
use crate::tool::error::{helpers::map_sqlx_error, AppError};
use crate::tool::get_id::IdGenerator;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, Row, TypeInfo, ValueRef};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// 데이터베이스 작업을 위한 쿼리 실행기
pub struct QueryExecutor {
    /// 연결 관리자
    connection: Arc<ConnectionManager>,

    /// 트랜잭션 관리자
    transactions: TransactionManager,

    /// 쿼리 설정
    config: QueryConfig,
}

impl QueryExecutor {
    /// 새 쿼리 실행기 생성
    pub fn new(connection: Arc<ConnectionManager>, config: QueryConfig) -> Self {
        Self {
            connection,
            transactions: TransactionManager::new(config.isolation_level),
            config,
        }
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    /// INSERT / UPDATE / DELETE 실행
    ///
    /// 영향받은 행이 있으면 커밋하고 `Ok(true)`, 없으면 롤백하고 `Ok(false)`.
    /// 드라이버 에러와 타임아웃은 롤백 후 `Err`로 돌려줍니다.
    pub async fn execute_non_query(
        &self,
        sql: &str,
        params: &QueryParams,
        success_label: &str,
    ) -> Result<bool, AppError> {
        let statement = NamedStatement::parse(sql);
        let values = statement.bind_order(params)?;
        self.log_query(statement.sql(), params);

        let start = Instant::now();
        let mut lease = self.connection.acquire().await?;

        let outcome = tokio::time::timeout(
            self.config.statement_timeout,
            self.run_non_query(&mut lease, statement.sql(), &values, success_label),
        )
        .await;

        let result = self.finish(lease, outcome, success_label).await;
        self.check_slow_query(statement.sql(), start.elapsed().as_millis() as u64);
        result
    }

    /// SELECT 실행
    ///
    /// 모든 행을 읽은 뒤 `column_types`에 있는 컬럼은 논리 타입으로 변환하고,
    /// 없는 컬럼은 드라이버 값 그대로 둡니다. 변환 실패가 하나라도 있으면 전체가 실패합니다.
    pub async fn execute_query(
        &self,
        sql: &str,
        params: &QueryParams,
        success_label: &str,
        column_types: &ColumnTypeMap,
    ) -> Result<Vec<QueryRow>, AppError> {
        let statement = NamedStatement::parse(sql);
        let values = statement.bind_order(params)?;
        self.log_query(statement.sql(), params);

        let start = Instant::now();
        let mut lease = self.connection.acquire().await?;

        let outcome = tokio::time::timeout(
            self.config.statement_timeout,
            self.run_query(&mut lease, statement.sql(), &values),
        )
        .await;

        let rows = self.finish(lease, outcome, success_label).await?;
        let elapsed = start.elapsed();
        self.check_slow_query(statement.sql(), elapsed.as_millis() as u64);

        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            results.push(row_to_map(row, column_types)?);
        }

        info!("{} ({} row(s))", success_label, results.len());
        debug!("Query returned {} rows in {:?}", results.len(), elapsed);
        Ok(results)
    }

    async fn run_non_query(
        &self,
        lease: &mut ConnectionLease,
        sql: &str,
        values: &[DbValue],
        success_label: &str,
    ) -> Result<bool, AppError> {
        let conn = lease.connection()?;
        let mut tx = self.transactions.begin(conn).await?;

        match build_query(sql, values).execute(&mut *tx).await {
            Ok(done) => {
                self.transactions
                    .settle(tx, done.rows_affected(), success_label)
                    .await
            }
            Err(e) => {
                self.transactions.rollback(tx).await;
                Err(map_sqlx_error(e, "execute_non_query"))
            }
        }
    }

    async fn run_query(
        &self,
        lease: &mut ConnectionLease,
        sql: &str,
        values: &[DbValue],
    ) -> Result<Vec<MySqlRow>, AppError> {
        let conn = lease.connection()?;
        let mut tx = self.transactions.begin(conn).await?;

        match build_query(sql, values).fetch_all(&mut *tx).await {
            Ok(rows) => {
                self.transactions.commit(tx).await?;
                Ok(rows)
            }
            Err(e) => {
                self.transactions.rollback(tx).await;
                Err(map_sqlx_error(e, "execute_query"))
            }
        }
    }

    /// 임대 반납과 타임아웃 처리
    ///
    /// 타임아웃이면 진행 중이던 문장의 상태를 알 수 없으므로 연결을 버립니다.
    /// 서버는 연결이 끊기면 열린 트랜잭션을 롤백합니다.
    async fn finish<T>(
        &self,
        lease: ConnectionLease,
        outcome: Result<Result<T, AppError>, tokio::time::error::Elapsed>,
        label: &str,
    ) -> Result<T, AppError> {
        match outcome {
            Ok(result) => {
                lease.release().await;
                result
            }
            Err(_) => {
                lease.invalidate().await;
                let err = AppError::Timeout(format!(
                    "statement exceeded {:?}",
                    self.config.statement_timeout
                ));
                err.log(label);
                Err(err)
            }
        }
    }

    /// Log query if enabled
    fn log_query(&self, sql: &str, params: &QueryParams) {
        if self.config.enable_query_logging {
            if params.is_empty() {
                debug!("Executing query: {}", sql);
            } else {
                debug!("Executing query: {} | Params: {:?}", sql, params);
            }
        }
    }

    /// Check for slow queries
    fn check_slow_query(&self, sql: &str, elapsed_ms: u64) {
        if elapsed_ms > self.config.slow_query_threshold_ms {
            warn!(
                "Slow query detected ({} ms): {}",
                elapsed_ms,
                sql.chars().take(200).collect::<String>()
            );
        }
    }
}

/// 파라미터 값을 등장 순서대로 바인딩
///
/// UUID는 CHAR(36) 저장 형식에 맞춰 하이픈 포함 문자열로 보냅니다.
fn build_query<'q>(sql: &'q str, values: &[DbValue]) -> Query<'q, MySql, MySqlArguments> {
    let mut query_builder = sqlx::query(sql);

    for value in values {
        query_builder = match value {
            DbValue::Null => query_builder.bind(Option::<String>::None),
            DbValue::Text(s) => query_builder.bind(s.clone()),
            DbValue::Integer(i) => query_builder.bind(*i),
            DbValue::Decimal(d) => query_builder.bind(*d),
            DbValue::Uuid(u) => query_builder.bind(IdGenerator::to_db_string(u)),
            DbValue::Timestamp(t) => query_builder.bind(*t),
            DbValue::Float(f) => query_builder.bind(*f),
            DbValue::Bytes(b) => query_builder.bind(b.clone()),
        };
    }

    query_builder
}

/// 결과 행을 컬럼 이름 → 값 맵으로 변환
fn row_to_map(row: &MySqlRow, column_types: &ColumnTypeMap) -> Result<QueryRow, AppError> {
    let mut result = QueryRow::new();

    for column in row.columns() {
        let column_name = column.name().to_string();
        let raw = read_raw(row, column.ordinal(), column.type_info().name())?;

        let value = match column_types.get(&column_name) {
            Some(target) => convert_value(raw, *target).map_err(|e| {
                error!("Column '{}' conversion failed: {}", column_name, e);
                AppError::from(e)
            })?,
            None => raw,
        };

        result.insert(column_name, value);
    }

    Ok(result)
}

/// MySQL 컬럼 타입 이름에 따라 원시 값을 읽습니다.
fn read_raw(row: &MySqlRow, index: usize, type_name: &str) -> Result<DbValue, AppError> {
    let is_null = row
        .try_get_raw(index)
        .map(|v| v.is_null())
        .map_err(|e| map_sqlx_error(e, "read column"))?;
    if is_null {
        return Ok(DbValue::Null);
    }

    let decode_err = |e: sqlx::Error| AppError::Conversion(format!("column {index} ({type_name}): {e}"));

    let value = match type_name {
        "BOOLEAN" => DbValue::Integer(i64::from(row.try_get::<bool, _>(index).map_err(decode_err)?)),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            DbValue::Integer(row.try_get::<i64, _>(index).map_err(decode_err)?)
        }
        name if name.ends_with("UNSIGNED") => {
            unsigned_value(row.try_get::<u64, _>(index).map_err(decode_err)?)
        }
        // sqlx는 UNSIGNED 플래그가 없으면 호환성 검사에서 거부하지만 디코딩은 가능
        "YEAR" | "BIT" => {
            unsigned_value(row.try_get_unchecked::<u64, _>(index).map_err(decode_err)?)
        }
        "DECIMAL" => DbValue::Decimal(row.try_get::<Decimal, _>(index).map_err(decode_err)?),
        "FLOAT" => DbValue::Float(f64::from(row.try_get::<f32, _>(index).map_err(decode_err)?)),
        "DOUBLE" => DbValue::Float(row.try_get::<f64, _>(index).map_err(decode_err)?),
        "DATETIME" | "TIMESTAMP" => {
            DbValue::Timestamp(row.try_get::<NaiveDateTime, _>(index).map_err(decode_err)?)
        }
        "DATE" => {
            let date = row.try_get::<NaiveDate, _>(index).map_err(decode_err)?;
            DbValue::Timestamp(date.and_time(NaiveTime::MIN))
        }
        "TIME" => DbValue::Text(
            row.try_get::<NaiveTime, _>(index)
                .map_err(decode_err)?
                .to_string(),
        ),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            DbValue::Bytes(row.try_get::<Vec<u8>, _>(index).map_err(decode_err)?)
        }
        "JSON" => DbValue::Text(
            row.try_get_unchecked::<String, _>(index)
                .map_err(decode_err)?,
        ),
        // 그 밖의 타입(GEOMETRY 등)은 문자열이 아니면 원시 바이트로 넘깁니다
        _ => match row.try_get::<String, _>(index) {
            Ok(s) => DbValue::Text(s),
            Err(_) => DbValue::Bytes(
                row.try_get_unchecked::<Vec<u8>, _>(index)
                    .map_err(decode_err)?,
            ),
        },
    };

    Ok(value)
}

fn unsigned_value(v: u64) -> DbValue {
    match i64::try_from(v) {
        Ok(i) => DbValue::Integer(i),
        Err(_) => DbValue::Decimal(Decimal::from(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_values_beyond_i64_become_decimal() {
        assert_eq!(unsigned_value(2024), DbValue::Integer(2024));
        assert_eq!(
            unsigned_value(u64::MAX),
            DbValue::Decimal(Decimal::from(u64::MAX))
        );
    }
}
