//! 상품 서비스
//!
//! 저장소 결과를 API가 쓰기 쉬운 형태(`Option` / `bool`)로 바꿉니다.

use crate::repository::product_repository::ProductRepository;
use shared::model::product_model::Product;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProductService {
    repository: ProductRepository,
}

impl ProductService {
    pub fn new(repository: ProductRepository) -> Self {
        Self { repository }
    }

    /// 조회에 실패하면 `None`
    pub async fn get_all_products(&self) -> Option<Vec<Product>> {
        let response = self.repository.get_all().await;
        if response.is_success {
            response.data
        } else {
            warn!("상품 목록 조회 실패");
            None
        }
    }

    /// 조회에 실패했거나 상품이 없으면 `None`
    pub async fn get_product_by_id(&self, id: Uuid) -> Option<Product> {
        let response = self.repository.get_by_id(id).await;
        if response.is_success {
            response.data
        } else {
            None
        }
    }

    pub async fn add_product(&self, product: Product) -> bool {
        let id = product.id;
        let added = self.repository.add(product).await.is_success;
        if added {
            info!("상품 추가: {}", id);
        }
        added
    }

    /// 존재하는 상품만 갱신합니다.
    pub async fn update_product(&self, product: Product) -> bool {
        if self.get_product_by_id(product.id).await.is_none() {
            warn!("갱신할 상품 없음: {}", product.id);
            return false;
        }
        self.repository.update(product).await.is_success
    }

    /// 존재하는 상품만 삭제합니다.
    pub async fn delete_product(&self, id: Uuid) -> bool {
        if self.get_product_by_id(id).await.is_none() {
            warn!("삭제할 상품 없음: {}", id);
            return false;
        }
        let deleted = self.repository.delete(id).await.is_success;
        if deleted {
            info!("상품 삭제: {}", id);
        }
        deleted
    }
}
