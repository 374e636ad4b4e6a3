//! 상품 REST API
//!
//! `/api/Products/`, `/api/Product/...` 엔드포인트

use crate::error::{ApiError, ApiResult};
use crate::service::product_service::ProductService;
use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::model::product_model::{Product, ProductFactory};
use shared::tool::error::helpers::validate_string;
use shared::tool::get_id::IdGenerator;
use tracing::error;
use uuid::Uuid;

/// `products.name` 컬럼 길이 (VARCHAR(255))
const MAX_NAME_LENGTH: usize = 255;

/// 상품 추가/갱신 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub price: Decimal,
    pub amount: i32,
}

impl ProductRequest {
    /// 이름은 비어 있지 않고(최대 255자), 가격은 0보다 크고, 수량은 0 이상
    pub fn validate(&self) -> ApiResult<()> {
        validate_string(&self.name, "name", MAX_NAME_LENGTH)?;
        if self.price <= Decimal::ZERO {
            return Err(ApiError::ValidationError(
                "The 'Price' must be greater than zero.".to_string(),
            ));
        }
        if self.amount < 0 {
            return Err(ApiError::ValidationError(
                "The 'Amount' must be zero or a positive integer.".to_string(),
            ));
        }
        Ok(())
    }

    /// id가 없으면 새로 발급합니다.
    pub fn into_product(self) -> Product {
        let id = self.id.unwrap_or_else(IdGenerator::generate);
        ProductFactory::create_product_with_id(id, &self.name, self.price, self.amount)
    }
}

/// 상품 목록 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

fn parse_product_id(raw: &str) -> ApiResult<Uuid> {
    Ok(IdGenerator::parse(raw)?)
}

/// 전체 상품 조회
pub async fn get_all_products(service: web::Data<ProductService>) -> ApiResult<HttpResponse> {
    match service.get_all_products().await {
        Some(products) => Ok(HttpResponse::Ok().json(ProductsResponse { products })),
        None => Err(ApiError::NotFound("products could not be loaded".to_string())),
    }
}

/// 상품 하나 조회
pub async fn get_product(
    service: web::Data<ProductService>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_product_id(&path)?;
    let product = service
        .get_product_by_id(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;
    Ok(HttpResponse::Ok().json(product))
}

/// 상품 추가
pub async fn add_product(
    service: web::Data<ProductService>,
    req: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let req = req.into_inner();
    req.validate()?;

    let product = req.into_product();
    if !service.add_product(product.clone()).await {
        error!("상품 추가 실패: {}", product.id);
        return Err(ApiError::Internal("failed to add product".to_string()));
    }
    Ok(HttpResponse::Ok().json(product))
}

/// 상품 갱신
pub async fn update_product(
    service: web::Data<ProductService>,
    req: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let req = req.into_inner();
    if req.id.is_none() {
        return Err(ApiError::ValidationError(
            "The 'Id' field is required.".to_string(),
        ));
    }
    req.validate()?;

    let product = req.into_product();
    if !service.update_product(product.clone()).await {
        return Err(ApiError::NotFound(format!("product {}", product.id)));
    }
    Ok(HttpResponse::Ok().json(product))
}

/// 상품 삭제
pub async fn delete_product(
    service: web::Data<ProductService>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_product_id(&path)?;
    if !service.delete_product(id).await {
        return Err(ApiError::NotFound(format!("product {id}")));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": id,
        "deleted": true
    })))
}

/// 상품 라우트 설정
pub fn configure_product_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/Products/", web::get().to(get_all_products))
            .route("/Product/", web::post().to(add_product))
            .route("/Product/", web::put().to(update_product))
            .route("/Product/{productId}", web::get().to(get_product))
            .route("/Product/{productId}", web::delete().to(delete_product)),
    );
}
