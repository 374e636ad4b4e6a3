//! 테이블 타입 레지스트리
//!
//! 테이블별 컬럼 → 논리 타입 매핑을 보관합니다. 시작 시 한 번 만들어지고
//! 이후에는 읽기 전용으로 `Arc`를 통해 공유됩니다.

use crate::service::db::core::types::{ColumnType, ColumnTypeMap};
use crate::tool::error::AppError;
use std::collections::HashMap;

/// 테이블 이름 → 컬럼 타입 맵
#[derive(Debug, Clone)]
pub struct TableRegistry {
    tables: HashMap<String, ColumnTypeMap>,
}

impl TableRegistry {
    pub fn builder() -> TableRegistryBuilder {
        TableRegistryBuilder::default()
    }

    /// 테이블의 컬럼 타입 맵을 조회합니다.
    ///
    /// 등록되지 않은 테이블은 `UnknownTable` 에러입니다.
    pub fn get_column_type_mapping(&self, table: &str) -> Result<&ColumnTypeMap, AppError> {
        self.tables
            .get(table)
            .ok_or_else(|| AppError::UnknownTable(table.to_string()))
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl Default for TableRegistry {
    /// 애플리케이션에 내장된 기본 레지스트리
    fn default() -> Self {
        TableRegistry::builder()
            .table(
                "products",
                [
                    ("id", ColumnType::Identifier),
                    ("name", ColumnType::Text),
                    ("price", ColumnType::Decimal),
                    ("amount", ColumnType::Integer),
                ],
            )
            .table(
                "test_table",
                [("id", ColumnType::Identifier), ("name", ColumnType::Text)],
            )
            .table(
                "another_table",
                [
                    ("column1", ColumnType::Integer),
                    ("column2", ColumnType::Timestamp),
                ],
            )
            .build()
    }
}

/// 레지스트리 빌더
#[derive(Debug, Default)]
pub struct TableRegistryBuilder {
    tables: HashMap<String, ColumnTypeMap>,
}

impl TableRegistryBuilder {
    /// 테이블을 등록합니다. 같은 이름으로 다시 등록하면 컬럼이 합쳐집니다.
    pub fn table<I, S>(mut self, name: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        let entry = self.tables.entry(name.to_string()).or_default();
        entry.extend(columns.into_iter().map(|(c, t)| (c.into(), t)));
        self
    }

    pub fn build(self) -> TableRegistry {
        TableRegistry {
            tables: self.tables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_products_mapping() {
        let registry = TableRegistry::default();
        let products = registry.get_column_type_mapping("products").unwrap();
        assert_eq!(products.get("id"), Some(&ColumnType::Identifier));
        assert_eq!(products.get("name"), Some(&ColumnType::Text));
        assert_eq!(products.get("price"), Some(&ColumnType::Decimal));
        assert_eq!(products.get("amount"), Some(&ColumnType::Integer));
        assert_eq!(products.len(), 4);
    }

    #[test]
    fn test_default_auxiliary_tables() {
        let registry = TableRegistry::default();
        let another = registry.get_column_type_mapping("another_table").unwrap();
        assert_eq!(another.get("column2"), Some(&ColumnType::Timestamp));
        assert!(registry.contains("test_table"));
        assert_eq!(registry.table_names().count(), 3);
    }

    #[test]
    fn test_unknown_table() {
        let registry = TableRegistry::default();
        assert_eq!(
            registry.get_column_type_mapping("nonexistent_table"),
            Err(AppError::UnknownTable("nonexistent_table".to_string()))
        );
    }

    #[test]
    fn test_builder_merges_columns() {
        let registry = TableRegistry::builder()
            .table("orders", [("id", ColumnType::Identifier)])
            .table("orders", [("placed_at", ColumnType::Timestamp)])
            .build();
        let orders = registry.get_column_type_mapping("orders").unwrap();
        assert_eq!(orders.len(), 2);
    }
}
