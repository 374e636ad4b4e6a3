//! 값 변환 모듈
//!
//! 드라이버에서 읽은 원시 값을 컬럼의 논리 타입으로 변환합니다.

use crate::service::db::core::types::{ColumnType, DbValue};
use crate::tool::error::AppError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;
use uuid::Uuid;

/// 변환 실패
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot convert {kind} value '{value}' to {target:?}: {reason}")]
pub struct ConversionError {
    pub kind: &'static str,
    pub value: String,
    pub target: ColumnType,
    pub reason: String,
}

impl ConversionError {
    fn new(raw: &DbValue, target: ColumnType, reason: impl Into<String>) -> Self {
        Self {
            kind: raw.kind(),
            value: raw.to_string(),
            target,
            reason: reason.into(),
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        AppError::Conversion(err.to_string())
    }
}

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// 원시 값을 `target` 타입으로 변환합니다.
///
/// NULL은 어떤 타입이든 NULL로 남습니다.
pub fn convert_value(raw: DbValue, target: ColumnType) -> Result<DbValue, ConversionError> {
    if raw.is_null() {
        return Ok(DbValue::Null);
    }
    trace!("convert {} -> {:?}", raw.kind(), target);

    match target {
        ColumnType::Identifier => to_identifier(raw),
        ColumnType::Text => to_text(raw),
        ColumnType::Decimal => to_decimal(raw),
        ColumnType::Integer => to_integer(raw),
        ColumnType::Timestamp => to_timestamp(raw),
    }
}

fn to_identifier(raw: DbValue) -> Result<DbValue, ConversionError> {
    let target = ColumnType::Identifier;
    if matches!(raw, DbValue::Uuid(_)) {
        return Ok(raw);
    }
    match &raw {
        DbValue::Text(s) => Uuid::parse_str(s.trim())
            .map(DbValue::Uuid)
            .map_err(|e| ConversionError::new(&raw, target, e.to_string())),
        DbValue::Bytes(b) if b.len() == 16 => Uuid::from_slice(b)
            .map(DbValue::Uuid)
            .map_err(|e| ConversionError::new(&raw, target, e.to_string())),
        // CHAR(36) with a binary collation comes back as bytes
        DbValue::Bytes(b) => std::str::from_utf8(b)
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(DbValue::Uuid)
            .ok_or_else(|| ConversionError::new(&raw, target, "not a textual or 16-byte uuid")),
        _ => Err(ConversionError::new(&raw, target, "unsupported source type")),
    }
}

fn to_text(raw: DbValue) -> Result<DbValue, ConversionError> {
    match raw {
        DbValue::Text(_) => Ok(raw),
        DbValue::Bytes(b) => String::from_utf8(b).map(DbValue::Text).map_err(|e| {
            let raw = DbValue::Bytes(e.as_bytes().to_vec());
            ConversionError::new(&raw, ColumnType::Text, "invalid utf-8")
        }),
        other => Ok(DbValue::Text(other.to_string())),
    }
}

fn to_decimal(raw: DbValue) -> Result<DbValue, ConversionError> {
    let target = ColumnType::Decimal;
    if matches!(raw, DbValue::Decimal(_)) {
        return Ok(raw);
    }
    match &raw {
        DbValue::Integer(v) => Ok(DbValue::Decimal(Decimal::from(*v))),
        DbValue::Float(v) => Decimal::from_f64(*v)
            .map(DbValue::Decimal)
            .ok_or_else(|| ConversionError::new(&raw, target, "not a finite number")),
        DbValue::Text(s) => parse_decimal(s)
            .map(DbValue::Decimal)
            .map_err(|e| ConversionError::new(&raw, target, e)),
        _ => Err(ConversionError::new(&raw, target, "unsupported source type")),
    }
}

fn to_integer(raw: DbValue) -> Result<DbValue, ConversionError> {
    let target = ColumnType::Integer;
    if matches!(raw, DbValue::Integer(_)) {
        return Ok(raw);
    }
    match &raw {
        DbValue::Decimal(d) => decimal_to_i64(*d)
            .map(DbValue::Integer)
            .ok_or_else(|| ConversionError::new(&raw, target, "not an integral value in range")),
        DbValue::Float(f) => Decimal::from_f64(*f)
            .and_then(decimal_to_i64)
            .map(DbValue::Integer)
            .ok_or_else(|| ConversionError::new(&raw, target, "not an integral value in range")),
        DbValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(DbValue::Integer)
            .map_err(|e| ConversionError::new(&raw, target, e.to_string())),
        _ => Err(ConversionError::new(&raw, target, "unsupported source type")),
    }
}

fn to_timestamp(raw: DbValue) -> Result<DbValue, ConversionError> {
    let target = ColumnType::Timestamp;
    if matches!(raw, DbValue::Timestamp(_)) {
        return Ok(raw);
    }
    match &raw {
        DbValue::Text(s) => parse_timestamp(s)
            .map(DbValue::Timestamp)
            .ok_or_else(|| ConversionError::new(&raw, target, "unrecognised timestamp format")),
        _ => Err(ConversionError::new(&raw, target, "unsupported source type")),
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, String> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| e.to_string())
}

fn decimal_to_i64(value: Decimal) -> Option<i64> {
    if value.fract().is_zero() {
        value.to_i64()
    } else {
        None
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
