//! REST API 모듈

pub mod product_api;

pub use product_api::{configure_product_routes, ProductRequest, ProductsResponse};
