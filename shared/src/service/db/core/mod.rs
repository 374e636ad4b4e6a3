//! Core database service modules
//!
//! 설정, 연결, 실행, 트랜잭션, 타입 레지스트리, 값 변환으로 관심사를 나눈 핵심 모듈

pub mod config;
pub mod connection;
pub mod convert;
pub mod executor;
pub mod registry;
pub mod statement;
pub mod transaction;
pub mod types;

pub use config::DbServiceConfig;
pub use connection::ConnectionManager;
pub use executor::QueryExecutor;
pub use registry::TableRegistry;
pub use transaction::TransactionManager;
pub use types::*;
