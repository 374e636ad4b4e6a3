//! Common type definitions for database service
//!
//! Shared types used across database service modules

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

/// 파라미터 값 / 셀 값
///
/// 호출자가 넘기는 파라미터와 DB에서 읽어 온 셀 값을 같은 타입으로 표현합니다.
/// `Float`와 `Bytes`는 타입 매핑이 없는 컬럼에서 드라이버 값이 그대로 넘어올 때만 나타납니다.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Uuid(Uuid),
    Timestamp(NaiveDateTime),
    Float(f64),
    Bytes(Vec<u8>),
}

impl DbValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DbValue::Null)
    }

    /// 로그용 타입 이름
    pub fn kind(&self) -> &'static str {
        match self {
            DbValue::Null => "null",
            DbValue::Text(_) => "text",
            DbValue::Integer(_) => "integer",
            DbValue::Decimal(_) => "decimal",
            DbValue::Uuid(_) => "uuid",
            DbValue::Timestamp(_) => "timestamp",
            DbValue::Float(_) => "float",
            DbValue::Bytes(_) => "bytes",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DbValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DbValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            DbValue::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            DbValue::Uuid(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for DbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbValue::Null => write!(f, "NULL"),
            DbValue::Text(s) => write!(f, "{s}"),
            DbValue::Integer(v) => write!(f, "{v}"),
            DbValue::Decimal(v) => write!(f, "{v}"),
            DbValue::Uuid(v) => write!(f, "{}", v.hyphenated()),
            DbValue::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            DbValue::Float(v) => write!(f, "{v}"),
            DbValue::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<String> for DbValue {
    fn from(value: String) -> Self {
        DbValue::Text(value)
    }
}

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_string())
    }
}

impl From<i64> for DbValue {
    fn from(value: i64) -> Self {
        DbValue::Integer(value)
    }
}

impl From<i32> for DbValue {
    fn from(value: i32) -> Self {
        DbValue::Integer(i64::from(value))
    }
}

impl From<Decimal> for DbValue {
    fn from(value: Decimal) -> Self {
        DbValue::Decimal(value)
    }
}

impl From<Uuid> for DbValue {
    fn from(value: Uuid) -> Self {
        DbValue::Uuid(value)
    }
}

impl From<NaiveDateTime> for DbValue {
    fn from(value: NaiveDateTime) -> Self {
        DbValue::Timestamp(value)
    }
}

impl From<f64> for DbValue {
    fn from(value: f64) -> Self {
        DbValue::Float(value)
    }
}

impl From<Vec<u8>> for DbValue {
    fn from(value: Vec<u8>) -> Self {
        DbValue::Bytes(value)
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DbValue::Null)
    }
}

/// Query parameters type - 파라미터 이름 → 값 (이름 순 정렬)
pub type QueryParams = BTreeMap<String, DbValue>;

/// Query result row type - 컬럼 이름 → 값
pub type QueryRow = BTreeMap<String, DbValue>;

/// 컬럼 논리 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// UUID (CHAR(36) 또는 BINARY(16)로 저장)
    Identifier,
    Text,
    Decimal,
    Integer,
    Timestamp,
}

/// 컬럼 이름 → 논리 타입
pub type ColumnTypeMap = HashMap<String, ColumnType>;

/// 파라미터 이름 정규화 (`@id` → `id`)
pub fn normalize_param_name(name: &str) -> &str {
    name.strip_prefix('@').unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_option_conversion() {
        assert_eq!(DbValue::from(None::<i64>), DbValue::Null);
        assert_eq!(DbValue::from(Some(5_i64)), DbValue::Integer(5));
        assert_eq!(DbValue::from(Some("x")), DbValue::Text("x".into()));
    }

    #[test]
    fn test_accessors() {
        let price = Decimal::from_str("9.99").unwrap();
        assert_eq!(DbValue::from(price).as_decimal(), Some(price));
        assert_eq!(DbValue::from(7).as_i64(), Some(7));
        assert_eq!(DbValue::from("a").as_i64(), None);
        assert!(DbValue::Null.is_null());
    }

    #[test]
    fn test_display_uuid_is_hyphenated() {
        let id = Uuid::from_str("936da01f-9abd-4d9d-80c7-02af85c822a8").unwrap();
        assert_eq!(
            DbValue::Uuid(id).to_string(),
            "936da01f-9abd-4d9d-80c7-02af85c822a8"
        );
    }

    #[test]
    fn test_normalize_param_name() {
        assert_eq!(normalize_param_name("@id"), "id");
        assert_eq!(normalize_param_name("name"), "name");
    }
}
