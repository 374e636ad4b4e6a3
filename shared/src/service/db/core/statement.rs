//! 이름 있는 파라미터 처리
//!
//! `@name` 형태의 자리표시자를 MySQL 위치 자리표시자 `?`로 바꾸고,
//! 등장 순서대로 바인딩할 값 목록을 만듭니다.

use crate::service::db::core::types::{normalize_param_name, DbValue, QueryParams};
use crate::tool::error::AppError;
use std::collections::BTreeSet;

/// `@name` 자리표시자를 `?`로 바꾼 SQL과 파라미터 등장 순서
#[derive(Debug, Clone, PartialEq)]
pub struct NamedStatement {
    sql: String,
    names: Vec<String>,
}

impl NamedStatement {
    /// SQL을 파싱합니다.
    ///
    /// 따옴표(`'`, `"`, `` ` ``) 안과 주석 안의 `@`는 건드리지 않고,
    /// `@@system_variable`도 그대로 둡니다.
    pub fn parse(sql: &str) -> Self {
        let chars: Vec<char> = sql.chars().collect();
        let mut out = String::with_capacity(sql.len());
        let mut names = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\'' | '"' | '`' => {
                    let end = skip_quoted(&chars, i, c);
                    out.extend(&chars[i..end]);
                    i = end;
                }
                '-' if chars.get(i + 1) == Some(&'-') => {
                    let end = skip_until_newline(&chars, i);
                    out.extend(&chars[i..end]);
                    i = end;
                }
                '#' => {
                    let end = skip_until_newline(&chars, i);
                    out.extend(&chars[i..end]);
                    i = end;
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    let end = skip_block_comment(&chars, i);
                    out.extend(&chars[i..end]);
                    i = end;
                }
                '@' if chars.get(i + 1) == Some(&'@') => {
                    // 시스템 변수
                    let end = scan_identifier(&chars, i + 2);
                    out.extend(&chars[i..end]);
                    i = end;
                }
                '@' if chars.get(i + 1).map_or(false, |n| is_ident_start(*n)) => {
                    let end = scan_identifier(&chars, i + 1);
                    names.push(chars[i + 1..end].iter().collect());
                    out.push('?');
                    i = end;
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
        }

        Self { sql: out, names }
    }

    /// 위치 자리표시자로 바뀐 SQL
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// 등장 순서대로의 파라미터 이름 (중복 포함)
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// 파라미터 집합을 등장 순서대로 정렬된 값 목록으로 바꿉니다.
    ///
    /// 값이 없는 자리표시자, 그리고 SQL에서 참조되지 않는 파라미터는 모두 에러입니다.
    /// 파라미터 이름 앞의 `@`는 무시합니다.
    pub fn bind_order(&self, params: &QueryParams) -> Result<Vec<DbValue>, AppError> {
        let mut normalized = QueryParams::new();
        for (key, value) in params {
            let name = normalize_param_name(key);
            if normalized.insert(name.to_string(), value.clone()).is_some() {
                return Err(AppError::InvalidInput(format!(
                    "parameter '{name}' supplied more than once"
                )));
            }
        }

        let mut values = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let value = normalized.get(name).ok_or_else(|| {
                AppError::InvalidInput(format!("missing value for parameter '@{name}'"))
            })?;
            values.push(value.clone());
        }

        let referenced: BTreeSet<&str> = self.names.iter().map(String::as_str).collect();
        if let Some(unused) = normalized.keys().find(|k| !referenced.contains(k.as_str())) {
            return Err(AppError::InvalidInput(format!(
                "parameter '{unused}' is not referenced by the statement"
            )));
        }

        Ok(values)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn scan_identifier(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && is_ident_char(chars[i]) {
        i += 1;
    }
    i
}

/// 닫는 따옴표 다음 위치를 반환. 이중 따옴표(`''`)와 백슬래시 이스케이프를 처리합니다.
fn skip_quoted(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && quote != '`' {
            i += 2;
            continue;
        }
        if c == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

fn skip_until_newline(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |p| start + p)
}

fn skip_block_comment(chars: &[char], start: usize) -> usize {
    let mut i = start + 2;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '/' {
            return i + 2;
        }
        i += 1;
    }
    chars.len()
}
