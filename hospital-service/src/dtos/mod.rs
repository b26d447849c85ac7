//! Request/response DTOs for the REST surface.

pub mod auth;
pub mod bills;
pub mod patients;

use rust_decimal::Decimal;
use serde_json::Value;

/// Coerce a JSON value into a quantity the way the billing form does:
/// numbers and numeric strings pass through, anything else counts as zero,
/// and the result is clamped to non-negative.
pub(crate) fn coerce_quantity(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0)
            .max(0),
        Value::String(s) => quantity_from_str(s),
        _ => 0,
    }
}

pub(crate) fn quantity_from_str(s: &str) -> i64 {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        .unwrap_or(0)
        .max(0)
}

/// Coerce a JSON value into a non-negative price; unparseable input counts
/// as zero.
pub(crate) fn coerce_price(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => price_from_str(&n.to_string()),
        Value::String(s) => price_from_str(s),
        _ => Decimal::ZERO,
    }
}

pub(crate) fn price_from_str(s: &str) -> Decimal {
    let s = s.trim();
    let parsed = s
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok());
    match parsed {
        Some(price) if !price.is_sign_negative() => price,
        _ => Decimal::ZERO,
    }
}
