//! 테스트용 메모리 CRUD 서비스

use async_trait::async_trait;
use shared::service::db::{CrudService, DbValue, QueryParams, QueryRow};
use std::collections::HashMap;
use std::sync::Mutex;

/// 테이블 이름 → 행 목록. `failing`이면 모든 작업이 실패합니다.
#[derive(Default)]
pub struct InMemoryCrud {
    tables: Mutex<HashMap<String, Vec<QueryRow>>>,
    failing: bool,
}

impl InMemoryCrud {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// 검증 없이 products 테이블에 행을 넣습니다.
    pub fn insert_raw(&self, row: QueryRow) {
        self.tables
            .lock()
            .unwrap()
            .entry("products".to_string())
            .or_default()
            .push(row);
    }
}

fn matches(row: &QueryRow, filter: &QueryParams) -> bool {
    filter.iter().all(|(k, v)| row.get(k) == Some(v))
}

#[async_trait]
impl CrudService for InMemoryCrud {
    async fn create(&self, table: &str, column_values: &QueryParams) -> bool {
        if self.failing || column_values.is_empty() {
            return false;
        }
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        if let Some(id) = column_values.get("id") {
            if rows.iter().any(|r| r.get("id") == Some(id)) {
                return false;
            }
        }
        rows.push(column_values.clone());
        true
    }

    async fn read(&self, table: &str, filter: &QueryParams) -> (bool, Vec<QueryRow>) {
        if self.failing {
            return (false, Vec::new());
        }
        let tables = self.tables.lock().unwrap();
        let rows = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| matches(r, filter)).cloned().collect())
            .unwrap_or_default();
        (true, rows)
    }

    async fn update(
        &self,
        table: &str,
        column_values: &QueryParams,
        id_column: &str,
        id_value: DbValue,
    ) -> bool {
        if self.failing || column_values.is_empty() {
            return false;
        }
        let mut tables = self.tables.lock().unwrap();
        let Some(rows) = tables.get_mut(table) else {
            return false;
        };
        let mut updated = false;
        for row in rows.iter_mut().filter(|r| r.get(id_column) == Some(&id_value)) {
            for (k, v) in column_values {
                row.insert(k.clone(), v.clone());
            }
            updated = true;
        }
        updated
    }

    async fn delete(&self, table: &str, id_column: &str, id_value: DbValue) -> bool {
        if self.failing {
            return false;
        }
        let mut tables = self.tables.lock().unwrap();
        let Some(rows) = tables.get_mut(table) else {
            return false;
        };
        let before = rows.len();
        rows.retain(|r| r.get(id_column) != Some(&id_value));
        rows.len() < before
    }
}
