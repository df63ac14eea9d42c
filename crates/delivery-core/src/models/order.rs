use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `{productId, productQuantity}` pair sent for quotes and orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i64,
    pub product_quantity: u32,
}

/// Body of POST /order/calculate/total/price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestBody {
    pub order_items: Vec<OrderItem>,
}

/// Server-computed price breakdown for a candidate cart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub products_price: Decimal,
    pub transport_price: Decimal,
    pub total_price: Decimal,
}

impl PriceQuote {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.products_price.is_zero() && self.transport_price.is_zero() && self.total_price.is_zero()
    }
}

/// Body of POST /order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Free-text notes for the restaurant
    pub mentions: String,
    pub order_items: Vec<OrderItem>,
}

/// Whatever the service returned for an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderConfirmation {
    pub details: serde_json::Value,
}

impl OrderConfirmation {
    /// Order id, when the service echoes one.
    pub fn order_id(&self) -> Option<i64> {
        self.details.get("id").and_then(|v| v.as_i64())
    }
}
