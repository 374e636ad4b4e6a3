//! 상품 저장소
//!
//! 서비스 계층과 범용 CRUD 계층 사이에서 `products` 테이블을 다룹니다.

use serde::Serialize;
use shared::model::product_model::{Product, PRODUCTS_TABLE};
use shared::service::db::{CrudService, DbValue, QueryParams, QueryRow};
use shared::tool::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// 저장소 작업 결과
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub is_success: bool,
    pub message: String,
    pub data: Option<T>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<T> ResponseEnvelope<T> {
    pub fn new(is_success: bool, data: Option<T>) -> Self {
        Self {
            is_success,
            message: String::new(),
            data,
            metadata: HashMap::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// `products` 테이블 저장소
#[derive(Clone)]
pub struct ProductRepository {
    crud: Arc<dyn CrudService>,
}

impl ProductRepository {
    pub fn new(crud: Arc<dyn CrudService>) -> Self {
        Self { crud }
    }

    pub async fn add(&self, product: Product) -> ResponseEnvelope<Product> {
        let status = self
            .crud
            .create(PRODUCTS_TABLE, &product.to_insert_values())
            .await;
        ResponseEnvelope::new(status, Some(product))
    }

    pub async fn get_all(&self) -> ResponseEnvelope<Vec<Product>> {
        let (status, rows) = self.crud.read(PRODUCTS_TABLE, &QueryParams::new()).await;
        let total = rows.len();
        let products = map_rows_to_products(&rows);
        let skipped = total - products.len();

        ResponseEnvelope::new(status, Some(products))
            .with_metadata("rows", serde_json::json!(total))
            .with_metadata("skipped", serde_json::json!(skipped))
    }

    /// 상품이 없으면 `data`가 `None`입니다.
    pub async fn get_by_id(&self, id: Uuid) -> ResponseEnvelope<Product> {
        let filter = QueryParams::from([("id".to_string(), DbValue::from(id))]);
        let (status, rows) = self.crud.read(PRODUCTS_TABLE, &filter).await;
        let product = map_rows_to_products(&rows)
            .into_iter()
            .find(|p| p.id == id);

        let envelope = ResponseEnvelope::new(status, product);
        if status && envelope.data.is_none() {
            envelope.with_message(format!("product {id} not found"))
        } else {
            envelope
        }
    }

    pub async fn update(&self, product: Product) -> ResponseEnvelope<Product> {
        let status = self
            .crud
            .update(
                PRODUCTS_TABLE,
                &product.to_column_values(),
                "id",
                DbValue::from(product.id),
            )
            .await;
        ResponseEnvelope::new(status, Some(product))
    }

    pub async fn delete(&self, id: Uuid) -> ResponseEnvelope<Uuid> {
        let status = self
            .crud
            .delete(PRODUCTS_TABLE, "id", DbValue::from(id))
            .await;
        ResponseEnvelope::new(status, Some(id))
    }
}

/// 결과 행 하나를 상품으로 변환
pub fn map_row_to_product(row: &QueryRow) -> Result<Product, AppError> {
    Product::from_row(row)
}

/// 결과 행들을 상품으로 변환합니다. 변환할 수 없는 행은 경고를 남기고 건너뜁니다.
pub fn map_rows_to_products(rows: &[QueryRow]) -> Vec<Product> {
    let products: Vec<Product> = rows
        .iter()
        .filter_map(|row| match map_row_to_product(row) {
            Ok(product) => Some(product),
            Err(e) => {
                warn!("잘못된 상품 행 건너뜀: {}", e);
                None
            }
        })
        .collect();

    debug!("{}개 행 중 {}개 상품 변환", rows.len(), products.len());
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryCrud;
    use rust_decimal::Decimal;
    use shared::model::product_model::ProductFactory;

    fn widget() -> Product {
        ProductFactory::create_product("Widget", Decimal::new(999, 2), 10)
    }

    #[test]
    fn test_map_rows_skips_invalid() {
        let good = widget().to_insert_values();
        let mut bad = widget().to_insert_values();
        bad.remove("name");

        let products = map_rows_to_products(&[good, bad]);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Widget");
    }

    #[tokio::test]
    async fn test_add_then_get_by_id() {
        let repo = ProductRepository::new(Arc::new(InMemoryCrud::default()));
        let product = widget();

        assert!(repo.add(product.clone()).await.is_success);

        let found = repo.get_by_id(product.id).await;
        assert!(found.is_success);
        assert_eq!(found.data, Some(product));
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let repo = ProductRepository::new(Arc::new(InMemoryCrud::default()));
        let found = repo.get_by_id(Uuid::new_v4()).await;
        assert!(found.is_success);
        assert!(found.data.is_none());
        assert!(!found.message.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_reports_skipped_rows() {
        let crud = InMemoryCrud::default();
        crud.insert_raw(widget().to_insert_values());
        let mut bad = widget().to_insert_values();
        bad.insert("amount".to_string(), DbValue::from("ten"));
        crud.insert_raw(bad);

        let repo = ProductRepository::new(Arc::new(crud));
        let all = repo.get_all().await;
        assert!(all.is_success);
        assert_eq!(all.data.map(|p| p.len()), Some(1));
        assert_eq!(all.metadata["skipped"], serde_json::json!(1));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let repo = ProductRepository::new(Arc::new(InMemoryCrud::default()));
        assert!(!repo.update(widget()).await.is_success);
        assert!(!repo.delete(Uuid::new_v4()).await.is_success);
    }
}
