//! 데이터베이스 서비스 모듈
//!
//! MySQL 데이터베이스와의 모든 상호작용을 처리하는 서비스들을 제공합니다.

// 핵심 모듈들 (설정, 연결, 실행, 트랜잭션, 레지스트리, 변환)
pub mod core;
// 테이블에 무관한 CRUD 서비스
pub mod crud_service;

pub use crud_service::{CrudService, CrudServiceImpl, SqlBuilder};

pub use core::{
    // 설정 관련
    config::{ConnectionConfig, ConnectionPolicy, DbServiceConfig, QueryConfig},
    // 연결 관리
    connection::{ConnectionLease, ConnectionManager},
    // 값 변환
    convert::{convert_value, ConversionError},
    // 쿼리 실행
    executor::QueryExecutor,
    // 타입 레지스트리
    registry::{TableRegistry, TableRegistryBuilder},
    statement::NamedStatement,
    // 트랜잭션 관리
    transaction::{IsolationLevel, TransactionManager},
    // 데이터 타입들
    types::{ColumnType, ColumnTypeMap, DbValue, QueryParams, QueryRow},
};
