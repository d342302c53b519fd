//! Order Model

use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// The backend sends free-form strings; known values are matched
/// case-insensitively and anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Open,
    Closed,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Other(s) => s,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "open" => Self::Open,
            "closed" => Self::Closed,
            _ => Self::Other(value),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table reference embedded in an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTableRef {
    pub id: i64,
    pub name: String,
}

/// Cashier reference embedded in an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUserRef {
    pub id: i64,
    pub name: String,
}

/// Food reference embedded in an order item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemFood {
    pub name: String,
}

/// Order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub food_id: i64,
    pub food: OrderItemFood,
    pub qty: u32,
    /// Unit price in currency unit
    pub price: i64,
    pub subtotal: i64,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    /// Total amount in currency unit
    pub total_price: i64,
    pub table_id: i64,
    pub table: OrderTableRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderUserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
}

impl Order {
    pub fn items(&self) -> &[OrderItem] {
        self.items.as_deref().unwrap_or_default()
    }
}

/// Line of a create-order request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub food_id: i64,
    pub qty: u32,
}

/// Create order payload
///
/// An empty `items` list opens an order for the table (which occupies it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_id: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderLineInput>,
}

/// Update order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
}

/// Body of `PUT orders/{id}/items/{food_id}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderItemQtyUpdate {
    pub qty: u32,
}

/// Order summary statistics for the order list header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderCounts {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
}

impl OrderCounts {
    pub fn from_orders(orders: &[Order]) -> Self {
        Self {
            total: orders.len(),
            open: orders.iter().filter(|o| o.status == OrderStatus::Open).count(),
            closed: orders.iter().filter(|o| o.status == OrderStatus::Closed).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_is_case_insensitive() {
        let status: OrderStatus = serde_json::from_str(r#""OPEN""#).unwrap();
        assert_eq!(status, OrderStatus::Open);

        let status: OrderStatus = serde_json::from_str(r#""pending_payment""#).unwrap();
        assert_eq!(status, OrderStatus::Other("pending_payment".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""pending_payment""#);
    }

    #[test]
    fn test_order_without_items_decodes() {
        let order: Order = serde_json::from_str(
            r#"{"id":7,"status":"open","total_price":0,"table_id":2,"table":{"id":2,"name":"Meja 2"}}"#,
        )
        .unwrap();
        assert!(order.items().is_empty());
        assert!(order.user.is_none());
    }

    #[test]
    fn test_create_order_omits_empty_items() {
        let body = serde_json::to_value(OrderCreate { table_id: 4, items: vec![] }).unwrap();
        assert_eq!(body, serde_json::json!({ "table_id": 4 }));
    }
}
