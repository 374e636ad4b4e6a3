//! 범용 CRUD 서비스
//!
//! 컬럼 → 값 맵으로 파라미터화된 SQL을 만들고 `QueryExecutor`로 실행합니다.
//! 에러는 호출자에게 전파하지 않고, 로그를 남긴 뒤 `false` / 빈 결과로 돌려줍니다.

use crate::service::db::core::executor::QueryExecutor;
use crate::service::db::core::registry::TableRegistry;
use crate::service::db::core::types::{normalize_param_name, DbValue, QueryParams, QueryRow};
use crate::tool::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// MySQL 식별자 최대 길이
const MAX_IDENTIFIER_LEN: usize = 64;

/// 범용 CRUD 서비스 trait
#[async_trait]
pub trait CrudService: Send + Sync {
    /// 행 하나를 삽입합니다.
    async fn create(&self, table: &str, column_values: &QueryParams) -> bool;

    /// 필터(컬럼 = 값, AND 결합)에 맞는 행을 읽습니다. 빈 필터는 전체 조회입니다.
    async fn read(&self, table: &str, filter: &QueryParams) -> (bool, Vec<QueryRow>);

    /// `id_column = id_value`인 행을 갱신합니다.
    async fn update(
        &self,
        table: &str,
        column_values: &QueryParams,
        id_column: &str,
        id_value: DbValue,
    ) -> bool;

    /// `id_column = id_value`인 행을 삭제합니다.
    async fn delete(&self, table: &str, id_column: &str, id_value: DbValue) -> bool;
}

/// `QueryExecutor` 기반 구현체
pub struct CrudServiceImpl {
    executor: Arc<QueryExecutor>,
    registry: Arc<TableRegistry>,
}

impl CrudServiceImpl {
    pub fn new(executor: Arc<QueryExecutor>, registry: Arc<TableRegistry>) -> Self {
        Self { executor, registry }
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    async fn try_create(&self, table: &str, column_values: &QueryParams) -> Result<bool, AppError> {
        let (sql, params) = SqlBuilder::insert(table, column_values)?;
        self.executor
            .execute_non_query(&sql, &params, &format!("Inserted into {table}"))
            .await
    }

    async fn try_read(&self, table: &str, filter: &QueryParams) -> Result<Vec<QueryRow>, AppError> {
        let column_types = self.registry.get_column_type_mapping(table)?;
        let (sql, params) = SqlBuilder::select(table, filter)?;
        self.executor
            .execute_query(&sql, &params, &format!("Read from {table}"), column_types)
            .await
    }

    async fn try_update(
        &self,
        table: &str,
        column_values: &QueryParams,
        id_column: &str,
        id_value: DbValue,
    ) -> Result<bool, AppError> {
        let (sql, params) = SqlBuilder::update(table, column_values, id_column, id_value)?;
        self.executor
            .execute_non_query(&sql, &params, &format!("Updated {table}"))
            .await
    }

    async fn try_delete(
        &self,
        table: &str,
        id_column: &str,
        id_value: DbValue,
    ) -> Result<bool, AppError> {
        let (sql, params) = SqlBuilder::delete(table, id_column, id_value)?;
        self.executor
            .execute_non_query(&sql, &params, &format!("Deleted from {table}"))
            .await
    }
}

#[async_trait]
impl CrudService for CrudServiceImpl {
    async fn create(&self, table: &str, column_values: &QueryParams) -> bool {
        self.try_create(table, column_values)
            .await
            .unwrap_or_else(|e| {
                e.log(&format!("create {table}"));
                false
            })
    }

    async fn read(&self, table: &str, filter: &QueryParams) -> (bool, Vec<QueryRow>) {
        match self.try_read(table, filter).await {
            Ok(rows) => (true, rows),
            Err(e) => {
                e.log(&format!("read {table}"));
                (false, Vec::new())
            }
        }
    }

    async fn update(
        &self,
        table: &str,
        column_values: &QueryParams,
        id_column: &str,
        id_value: DbValue,
    ) -> bool {
        self.try_update(table, column_values, id_column, id_value)
            .await
            .unwrap_or_else(|e| {
                e.log(&format!("update {table}"));
                false
            })
    }

    async fn delete(&self, table: &str, id_column: &str, id_value: DbValue) -> bool {
        self.try_delete(table, id_column, id_value)
            .await
            .unwrap_or_else(|e| {
                e.log(&format!("delete {table}"));
                false
            })
    }
}

/// CRUD 문장 생성기
///
/// 값은 절대 SQL 문자열에 들어가지 않고 `@이름` 파라미터로만 전달됩니다.
/// 테이블과 컬럼 이름은 검증 후 백틱으로 감쌉니다.
pub struct SqlBuilder;

impl SqlBuilder {
    /// `INSERT INTO `t` (`a`, `b`) VALUES (@a, @b)`
    pub fn insert(table: &str, column_values: &QueryParams) -> Result<(String, QueryParams), AppError> {
        let table = quote_identifier(table)?;
        if column_values.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "INSERT into {table} has no column values"
            )));
        }

        let params = normalize_params(column_values)?;
        let mut columns = Vec::with_capacity(params.len());
        let mut placeholders = Vec::with_capacity(params.len());
        for name in params.keys() {
            columns.push(quote_identifier(name)?);
            placeholders.push(format!("@{name}"));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );
        debug!("Built INSERT: {}", sql);
        Ok((sql, params))
    }

    /// `SELECT * FROM `t` [WHERE `a` = @a AND ...]`
    pub fn select(table: &str, filter: &QueryParams) -> Result<(String, QueryParams), AppError> {
        let table = quote_identifier(table)?;
        let params = normalize_params(filter)?;

        let mut sql = format!("SELECT * FROM {table}");
        if !params.is_empty() {
            let conditions = params
                .keys()
                .map(|name| Ok(format!("{} = @{}", quote_identifier(name)?, name)))
                .collect::<Result<Vec<_>, AppError>>()?;
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        debug!("Built SELECT: {}", sql);
        Ok((sql, params))
    }

    /// `UPDATE `t` SET `a` = @a, ... WHERE `id` = @id`
    ///
    /// 갱신할 컬럼이 없으면 에러입니다. `id_column`이 SET에도 있으면 같은 값이어야 합니다.
    pub fn update(
        table: &str,
        column_values: &QueryParams,
        id_column: &str,
        id_value: DbValue,
    ) -> Result<(String, QueryParams), AppError> {
        let table = quote_identifier(table)?;
        if column_values.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "UPDATE of {table} has no columns to set"
            )));
        }

        let id_name = normalize_param_name(id_column).to_string();
        let id_quoted = quote_identifier(&id_name)?;
        let mut params = normalize_params(column_values)?;

        let assignments = params
            .keys()
            .map(|name| Ok(format!("{} = @{}", quote_identifier(name)?, name)))
            .collect::<Result<Vec<_>, AppError>>()?;

        if let Some(existing) = params.get(&id_name) {
            if *existing != id_value {
                return Err(AppError::InvalidInput(format!(
                    "id column '{id_name}' is also being set to a different value"
                )));
            }
        }
        params.insert(id_name.clone(), id_value);

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = @{}",
            table,
            assignments.join(", "),
            id_quoted,
            id_name
        );
        debug!("Built UPDATE: {}", sql);
        Ok((sql, params))
    }

    /// `DELETE FROM `t` WHERE `id` = @id`
    pub fn delete(
        table: &str,
        id_column: &str,
        id_value: DbValue,
    ) -> Result<(String, QueryParams), AppError> {
        let table = quote_identifier(table)?;
        let id_name = normalize_param_name(id_column).to_string();
        let id_quoted = quote_identifier(&id_name)?;

        let mut params = QueryParams::new();
        params.insert(id_name.clone(), id_value);

        let sql = format!("DELETE FROM {} WHERE {} = @{}", table, id_quoted, id_name);
        debug!("Built DELETE: {}", sql);
        Ok((sql, params))
    }
}

/// 파라미터 이름의 `@` 접두사를 제거합니다.
fn normalize_params(params: &QueryParams) -> Result<QueryParams, AppError> {
    let mut normalized = QueryParams::new();
    for (key, value) in params {
        let name = normalize_param_name(key);
        if normalized.insert(name.to_string(), value.clone()).is_some() {
            return Err(AppError::InvalidInput(format!(
                "column '{name}' supplied more than once"
            )));
        }
    }
    Ok(normalized)
}

/// 단순 SQL 식별자만 허용하고 백틱으로 감쌉니다.
fn quote_identifier(name: &str) -> Result<String, AppError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > MAX_IDENTIFIER_LEN {
        return Err(AppError::InvalidInput(format!("invalid identifier: '{name}'")));
    }
    Ok(format!("`{name}`"))
}
