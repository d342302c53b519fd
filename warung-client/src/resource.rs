//! Managed entity kinds
//!
//! A [`Resource`] is an entity list the client caches and polls, with one
//! field under optimistic control (`is_active` for foods, `status` for
//! orders and tables).

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::models::{
    DiningTableCreate, DiningTableUpdate, FoodCreate, FoodUpdate, OrderCreate, OrderUpdate,
};
use shared::{DiningTable, Food, Order, OrderStatus, TableStatus};
use std::fmt::Debug;

/// The managed entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Foods,
    Orders,
    Tables,
}

impl ResourceKind {
    /// Collection path relative to the API base
    pub fn path(&self) -> &'static str {
        match self {
            Self::Foods => "foods",
            Self::Orders => "orders",
            Self::Tables => "tables",
        }
    }

    /// Singular label for notifications
    pub fn label(&self) -> &'static str {
        match self {
            Self::Foods => "Food",
            Self::Orders => "Order",
            Self::Tables => "Table",
        }
    }

    /// Other lists whose server state changes when this one's status does
    ///
    /// Opening a table creates an order; closing an order frees its table.
    pub fn dependents(&self) -> &'static [ResourceKind] {
        match self {
            Self::Foods => &[],
            Self::Orders => &[ResourceKind::Tables],
            Self::Tables => &[ResourceKind::Orders],
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Remote call that changes an entity's optimistic field
#[derive(Debug, Clone)]
pub struct StatusRequest {
    pub method: Method,
    pub path: String,
    pub body: serde_json::Value,
}

/// An entity kind managed by a [`crate::ResourceCache`]
pub trait Resource:
    Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Type of the field under optimistic control
    type Status: Clone + Debug + PartialEq + Send + Sync + 'static;
    /// Create payload
    type Create: Serialize + Debug + Send + Sync + 'static;
    /// Update payload
    type Update: Serialize + Debug + Send + Sync + 'static;

    const KIND: ResourceKind;
    /// Wire name of the optimistic field
    const STATUS_FIELD: &'static str;

    fn id(&self) -> i64;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, value: Self::Status);

    /// Route and body that persist a new status value
    fn status_request(id: i64, value: &Self::Status) -> StatusRequest;
}

impl Resource for Food {
    type Status = bool;
    type Create = FoodCreate;
    type Update = FoodUpdate;

    const KIND: ResourceKind = ResourceKind::Foods;
    const STATUS_FIELD: &'static str = "is_active";

    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> bool {
        self.is_active
    }

    fn set_status(&mut self, value: bool) {
        self.is_active = value;
    }

    fn status_request(id: i64, value: &bool) -> StatusRequest {
        StatusRequest {
            method: Method::PUT,
            path: format!("foods/{id}/status"),
            body: json!({ "is_active": value }),
        }
    }
}

impl Resource for Order {
    type Status = OrderStatus;
    type Create = OrderCreate;
    type Update = OrderUpdate;

    const KIND: ResourceKind = ResourceKind::Orders;
    const STATUS_FIELD: &'static str = "status";

    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> OrderStatus {
        self.status.clone()
    }

    fn set_status(&mut self, value: OrderStatus) {
        self.status = value;
    }

    fn status_request(id: i64, value: &OrderStatus) -> StatusRequest {
        StatusRequest {
            method: Method::PATCH,
            path: format!("orders/{id}/status"),
            body: json!({ "status": value }),
        }
    }
}

impl Resource for DiningTable {
    type Status = TableStatus;
    type Create = DiningTableCreate;
    type Update = DiningTableUpdate;

    const KIND: ResourceKind = ResourceKind::Tables;
    const STATUS_FIELD: &'static str = "status";

    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> TableStatus {
        self.status
    }

    fn set_status(&mut self, value: TableStatus) {
        self.status = value;
    }

    fn status_request(id: i64, value: &TableStatus) -> StatusRequest {
        match value {
            TableStatus::Reserved => StatusRequest {
                method: Method::POST,
                path: format!("tables/{id}/reserve"),
                body: serde_json::Value::Null,
            },
            // Opening an order is what occupies a table.
            TableStatus::Occupied => StatusRequest {
                method: Method::POST,
                path: "orders".to_string(),
                body: json!({ "table_id": id }),
            },
            TableStatus::Available | TableStatus::Inactive => StatusRequest {
                method: Method::PATCH,
                path: format!("tables/{id}/status"),
                body: json!({ "status": value }),
            },
        }
    }
}
