// Balance record shaping
// Upstream spot accounts → fixed {currency, available, frozen, total} schema

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

// Candidate upstream field names per output field, tried in order.
// Different client library versions of the exchange API disagree on naming.
pub const CURRENCY_FIELDS: &[&str] = &["currency", "currency_code"];
pub const AVAILABLE_FIELDS: &[&str] = &["available", "available_balance"];
pub const FROZEN_FIELDS: &[&str] = &["frozen", "freeze", "locked"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub currency: String,
    pub available: String,
    pub frozen: String,
    pub total: String,
}

impl BalanceRecord {
    /// Zeroed USDT record served when the exchange is unreachable and
    /// degraded balances are enabled.
    pub fn degraded() -> Self {
        Self {
            currency: "USDT".to_string(),
            available: "0".to_string(),
            frozen: "0".to_string(),
            total: "0".to_string(),
        }
    }
}

/// First candidate that is present and not null, rendered as a string.
fn pick(record: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|v| !v.is_null())
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

fn parse_decimal(s: &str) -> Decimal {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .unwrap_or(Decimal::ZERO)
}

pub fn shape_balance(record: &Value) -> BalanceRecord {
    let currency = pick(record, CURRENCY_FIELDS).unwrap_or_default();
    let available = pick(record, AVAILABLE_FIELDS).unwrap_or_else(|| "0".to_string());
    let frozen = pick(record, FROZEN_FIELDS).unwrap_or_else(|| "0".to_string());
    // Saturates at the Decimal range bound rather than overflowing
    let total = parse_decimal(&available)
        .saturating_add(parse_decimal(&frozen))
        .normalize()
        .to_string();

    BalanceRecord {
        currency,
        available,
        frozen,
        total,
    }
}

/// Shape a spot accounts listing. A body that is not an array comes back
/// unchanged in `Err` so it can be passed through.
pub fn shape_balances(raw: Value) -> Result<Vec<BalanceRecord>, Value> {
    match raw {
        Value::Array(items) => Ok(items.iter().map(shape_balance).collect()),
        other => Err(other),
    }
}
