//! Input checks shared by the resource validators.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(e: FieldError) -> Self {
        ApiError::validation("Datos inválidos", format!("El campo {} {}", e.field, e.reason))
    }
}

/// A value counts as provided only when it is present and non-empty.
pub fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

pub fn password_long_enough(p: &str) -> bool {
    p.chars().count() >= MIN_PASSWORD_LEN
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn check_email(email: &str) -> Result<(), FieldError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(FieldError::new("email", "debe ser una dirección de correo válida"))
    }
}

/// Accepts a JSON number or a numeric string. Anything that would not come out
/// as a finite number is rejected.
pub fn coerce_number(field: &'static str, v: &Value) -> Result<f64, FieldError> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
        .ok_or_else(|| FieldError::new(field, "debe ser numérico"))
}

pub fn coerce_integer(field: &'static str, v: &Value) -> Result<i64, FieldError> {
    let n = match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    n.ok_or_else(|| FieldError::new(field, "debe ser un número entero"))
}

/// Raw `page` / `limit` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// Rows to skip. Pages built by [`parse_page`] never overflow here.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

pub fn parse_page(q: &PageQuery) -> Result<Page, FieldError> {
    let positive = |field: &'static str, raw: &Option<String>, default: i64| match present(raw) {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| FieldError::new(field, "debe ser un entero positivo")),
    };
    let page = positive("page", &q.page, DEFAULT_PAGE)?;
    let limit = positive("limit", &q.limit, DEFAULT_LIMIT)?;
    // the offset has to fit in an i64 for the store
    if (page - 1).checked_mul(limit).is_none() {
        return Err(FieldError::new("page", "está fuera de rango"));
    }
    Ok(Page { page, limit })
}

pub fn parse_optional_number(
    field: &'static str,
    raw: &Option<String>,
) -> Result<Option<f64>, FieldError> {
    present(raw)
        .map(|s| coerce_number(field, &Value::String(s.to_owned())))
        .transpose()
}

/// Path ids that are not integers cannot match any row.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
