//! Shared request-parameter parsing for the handler modules.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use super::error::err;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "not_found",
            message: message.into(),
            details: None,
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self {
            code: "cancelled",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

/// Trimmed string param; absent, null or blank all read as None.
pub fn opt_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    opt_str(params, key).ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn opt_bool(params: &serde_json::Value, key: &str) -> Option<bool> {
    params.get(key).and_then(|v| v.as_bool())
}

pub fn required_bool(params: &serde_json::Value, key: &str) -> Result<bool, HandlerErr> {
    opt_bool(params, key).ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn opt_u64(params: &serde_json::Value, key: &str) -> Option<u64> {
    params.get(key).and_then(|v| v.as_u64())
}

pub fn opt_decimal(params: &serde_json::Value, key: &str) -> Result<Option<Decimal>, HandlerErr> {
    let Some(v) = params.get(key) else {
        return Ok(None);
    };
    if v.is_null() {
        return Ok(None);
    }
    if !v.is_number() {
        return Err(HandlerErr::bad_params(format!("{} must be a number", key)));
    }
    serde_json::from_value::<Decimal>(v.clone())
        .map(Some)
        .map_err(|_| HandlerErr::bad_params(format!("{} is not a valid amount", key)))
}

pub fn required_decimal(params: &serde_json::Value, key: &str) -> Result<Decimal, HandlerErr> {
    opt_decimal(params, key)?.ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Non-negative amount with a zero default, for enrollment fields.
pub fn amount_or_zero(params: &serde_json::Value, key: &str) -> Result<Decimal, HandlerErr> {
    let v = opt_decimal(params, key)?.unwrap_or(Decimal::ZERO);
    if v < Decimal::ZERO {
        return Err(HandlerErr::bad_params(format!(
            "{} must not be negative",
            key
        )));
    }
    Ok(v)
}

pub fn opt_date(params: &serde_json::Value, key: &str) -> Result<Option<NaiveDate>, HandlerErr> {
    let Some(raw) = opt_str(params, key) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

/// Effective "today" for date-sensitive operations: the optional asOf param,
/// falling back to the system date. Core logic never reads the clock itself.
pub fn as_of(params: &serde_json::Value) -> Result<NaiveDate, HandlerErr> {
    Ok(opt_date(params, "asOf")?.unwrap_or_else(|| Local::now().date_naive()))
}
