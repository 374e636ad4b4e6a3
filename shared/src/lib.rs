//! warehub 공유 라이브러리
//!
//! 설정, 에러, 로깅, 그리고 MySQL 위의 범용 CRUD 데이터 접근 계층을 제공합니다.

pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod tool;
