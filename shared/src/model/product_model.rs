//! 상품 도메인 모델

use crate::service::db::core::types::{DbValue, QueryParams, QueryRow};
use crate::tool::error::AppError;
use crate::tool::get_id::IdGenerator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `products` 테이블 이름
pub const PRODUCTS_TABLE: &str = "products";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub amount: i32,
}

impl Product {
    /// id를 제외한 컬럼 값 (UPDATE SET 용)
    pub fn to_column_values(&self) -> QueryParams {
        QueryParams::from([
            ("name".to_string(), DbValue::from(self.name.as_str())),
            ("price".to_string(), DbValue::from(self.price)),
            ("amount".to_string(), DbValue::from(self.amount)),
        ])
    }

    /// id를 포함한 전체 컬럼 값 (INSERT 용)
    pub fn to_insert_values(&self) -> QueryParams {
        let mut values = self.to_column_values();
        values.insert("id".to_string(), DbValue::from(self.id));
        values
    }

    /// 변환된 결과 행에서 상품을 만듭니다.
    ///
    /// 필드가 없거나 NULL이거나 타입이 맞지 않으면 `InvalidFormat` 에러입니다.
    pub fn from_row(row: &QueryRow) -> Result<Self, AppError> {
        let id = field(row, "id")?
            .as_uuid()
            .ok_or_else(|| wrong_type("id", "uuid"))?;
        let name = field(row, "name")?
            .as_str()
            .ok_or_else(|| wrong_type("name", "text"))?
            .to_string();
        let price = field(row, "price")?
            .as_decimal()
            .ok_or_else(|| wrong_type("price", "decimal"))?;
        let amount = field(row, "amount")?
            .as_i64()
            .ok_or_else(|| wrong_type("amount", "integer"))?;
        let amount = i32::try_from(amount)
            .map_err(|_| AppError::InvalidFormat(format!("amount out of range: {amount}")))?;

        Ok(Self {
            id,
            name,
            price,
            amount,
        })
    }
}

fn field<'a>(row: &'a QueryRow, column: &str) -> Result<&'a DbValue, AppError> {
    match row.get(column) {
        None | Some(DbValue::Null) => Err(AppError::MissingField(column.to_string())),
        Some(value) => Ok(value),
    }
}

fn wrong_type(column: &str, expected: &str) -> AppError {
    AppError::InvalidFormat(format!("{column} is not {expected}"))
}

/// 상품 생성기
pub struct ProductFactory;

impl ProductFactory {
    /// 새 id로 상품을 만듭니다.
    pub fn create_product(name: &str, price: Decimal, amount: i32) -> Product {
        Self::create_product_with_id(IdGenerator::generate(), name, price, amount)
    }

    pub fn create_product_with_id(id: Uuid, name: &str, price: Decimal, amount: i32) -> Product {
        Product {
            id,
            name: name.to_string(),
            price,
            amount,
        }
    }
}
