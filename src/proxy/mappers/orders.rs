// Order request mapping
// Inbound order payloads are validated here before anything is signed or sent

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use std::str::FromStr;
use url::form_urlencoded;

use crate::error::ProxyError;
use crate::proxy::upstream::SPOT_ORDERS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Open,
    Finished,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Finished => "finished",
        }
    }
}

/// Decimal given either as a JSON string or a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DecimalInput {
    Text(String),
    Number(Number),
}

impl DecimalInput {
    fn as_text(&self) -> String {
        match self {
            DecimalInput::Text(s) => s.trim().to_string(),
            DecimalInput::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub currency_pair: Option<String>,
    #[serde(default, rename = "type")]
    pub order_type: OrderType,
    pub side: OrderSide,
    pub amount: DecimalInput,
    #[serde(default)]
    pub price: Option<DecimalInput>,
    #[serde(default)]
    pub time_in_force: Option<String>,
}

fn positive_decimal(field: &str, input: &DecimalInput) -> Result<String, ProxyError> {
    let text = input.as_text();
    match Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        Ok(d) if d > Decimal::ZERO => Ok(text),
        Ok(_) => Err(ProxyError::InvalidRequest(format!(
            "{} must be greater than zero",
            field
        ))),
        Err(_) => Err(ProxyError::InvalidRequest(format!(
            "{} is not a decimal number: {}",
            field, text
        ))),
    }
}

impl CreateOrderRequest {
    /// Validate and build the exchange order body.
    pub fn into_upstream_body(self) -> Result<Value, ProxyError> {
        let currency_pair = self
            .currency_pair
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProxyError::InvalidRequest("currency_pair is required".into()))?
            .to_string();

        let amount = positive_decimal("amount", &self.amount)?;

        let mut body = json!({
            "currency_pair": currency_pair,
            "type": self.order_type,
            "side": self.side,
            "amount": amount,
        });

        match self.order_type {
            OrderType::Limit => {
                let price = self.price.as_ref().ok_or_else(|| {
                    ProxyError::InvalidRequest("price is required for limit orders".into())
                })?;
                body["price"] = Value::String(positive_decimal("price", price)?);
                if let Some(tif) = self.time_in_force {
                    body["time_in_force"] = Value::String(tif);
                }
            }
            OrderType::Market => {
                // The exchange rejects its `gtc` default for market orders
                let tif = self.time_in_force.unwrap_or_else(|| "ioc".to_string());
                body["time_in_force"] = Value::String(tif);
            }
        }

        Ok(body)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub currency_pair: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query for `GET /spot/orders`. Key order is fixed so the signed string and
/// the sent string are the same.
pub fn list_orders_query(status: OrderStatus, query: &ListOrdersQuery) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if let Some(pair) = query.currency_pair.as_deref().map(str::trim) {
        if !pair.is_empty() {
            serializer.append_pair("currency_pair", pair);
        }
    }
    serializer.append_pair("status", status.as_str());
    if let Some(page) = query.page {
        serializer.append_pair("page", &page.to_string());
    }
    if let Some(limit) = query.limit {
        serializer.append_pair("limit", &limit.to_string());
    }
    serializer.finish()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelOrderQuery {
    pub currency_pair: Option<String>,
}

/// Path and query for `DELETE /spot/orders/{id}`.
pub fn cancel_order_target(
    order_id: &str,
    query: &CancelOrderQuery,
) -> Result<(String, String), ProxyError> {
    let order_id = order_id.trim();
    if order_id.is_empty() {
        return Err(ProxyError::InvalidRequest("order id is required".into()));
    }
    if !order_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ProxyError::InvalidRequest(format!(
            "invalid order id: {}",
            order_id
        )));
    }

    let pair = query
        .currency_pair
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProxyError::InvalidRequest("currency_pair is required".into()))?;

    let path = format!("{}/{}", SPOT_ORDERS, order_id);
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("currency_pair", pair)
        .finish();
    Ok((path, query))
}
