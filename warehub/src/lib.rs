//! Warehub Library Module
//!
//! 상품 저장소, 서비스, REST API, 적재 도구

pub mod api;
pub mod app;
pub mod error;
pub mod populate;
pub mod repository;
pub mod service;

#[cfg(test)]
mod testing;

pub use error::{ApiError, ApiResult};
pub use repository::product_repository::{ProductRepository, ResponseEnvelope};
pub use service::product_service::ProductService;
