//! In-memory backend for reconciliation tests
//!
//! Stores every list as JSON values keyed by resource path, so one
//! implementation serves all resource kinds. Status calls can be failed or
//! held open with a gate to drive the optimistic paths deterministically.

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use shared::models::{OrderCreate, OrderItemFood, OrderTableRef};
use shared::{DiningTable, Food, Order, OrderItem, OrderStatus, TableStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::oneshot;
use warung_client::{ClientError, ClientResult, OrderApi, Resource, ResourceApi};

/// How a held status call resolves
pub type GateOutcome = Result<(), String>;

#[derive(Default)]
pub struct FakeBackend {
    lists: Mutex<HashMap<&'static str, Vec<Value>>>,
    gates: Mutex<VecDeque<oneshot::Receiver<GateOutcome>>>,
    status_failures: Mutex<VecDeque<String>>,
    fail_fetch: AtomicBool,
    fetches: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

pub fn food(id: i64, name: &str, price: i64, is_active: bool) -> Food {
    Food {
        id,
        name: name.to_string(),
        description: None,
        category: Some("Main".to_string()),
        price,
        is_active,
    }
}

pub fn table(id: i64, status: TableStatus) -> DiningTable {
    DiningTable {
        id,
        name: format!("Table {id}"),
        status,
    }
}

/// Open order for `table_id` with `(food, qty)` lines
pub fn open_order(id: i64, table_id: i64, lines: &[(&Food, u32)]) -> Order {
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(f, qty)| OrderItem {
            food_id: f.id,
            food: OrderItemFood {
                name: f.name.clone(),
            },
            qty: *qty,
            price: f.price,
            subtotal: f.price * i64::from(*qty),
        })
        .collect();
    Order {
        id,
        status: OrderStatus::Open,
        total_price: items.iter().map(|i| i.subtotal).sum(),
        table_id,
        table: OrderTableRef {
            id: table_id,
            name: format!("Table {table_id}"),
        },
        user: None,
        items: Some(items),
        created_at: None,
        updated_at: None,
        opened_at: None,
        closed_at: None,
    }
}

fn rejected(message: impl Into<String>) -> ClientError {
    ClientError::Api {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list<R: Resource>(self, items: Vec<R>) -> Self {
        self.put_list(items);
        self
    }

    /// Replace a server-side list, as another terminal would
    pub fn put_list<R: Resource>(&self, items: Vec<R>) {
        let values = items
            .iter()
            .map(|i| serde_json::to_value(i).unwrap())
            .collect();
        self.lists.lock().unwrap().insert(R::KIND.path(), values);
    }

    /// Server-side copy of a list
    pub fn list<R: Resource>(&self) -> Vec<R> {
        self.lists
            .lock()
            .unwrap()
            .get(R::KIND.path())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    pub fn server_entity<R: Resource>(&self, id: i64) -> Option<R> {
        self.list::<R>().into_iter().find(|e| e.id() == id)
    }

    /// Fail the next status call with a `{message}` rejection
    pub fn fail_next_status(&self, message: &str) {
        self.status_failures
            .lock()
            .unwrap()
            .push_back(message.to_string());
    }

    /// Hold the next status call open until the returned sender fires
    pub fn gate_next_status(&self) -> oneshot::Sender<GateOutcome> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn modify<R: Resource>(&self, id: i64, f: impl FnOnce(&mut R)) -> ClientResult<R> {
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry(R::KIND.path()).or_default();
        for value in list.iter_mut() {
            let mut entity: R = serde_json::from_value(value.clone())?;
            if entity.id() == id {
                f(&mut entity);
                *value = serde_json::to_value(&entity)?;
                return Ok(entity);
            }
        }
        Err(ClientError::NotFound(format!("{} {id}", R::KIND.label())))
    }

    fn next_id(list: &[Value]) -> i64 {
        list.iter()
            .filter_map(|v| v.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1
    }

    fn modify_order(&self, order_id: i64, f: impl FnOnce(&mut Order)) -> ClientResult<()> {
        self.modify::<Order>(order_id, |order| {
            f(order);
            let items = order.items.get_or_insert_with(Vec::new);
            for item in items.iter_mut() {
                item.subtotal = item.price * i64::from(item.qty);
            }
            order.total_price = items.iter().map(|i| i.subtotal).sum();
        })
        .map(|_| ())
    }

    fn order_line(&self, food_id: i64, qty: u32) -> ClientResult<Value> {
        let food = self
            .server_entity::<Food>(food_id)
            .ok_or_else(|| rejected("Food not found"))?;
        Ok(json!({
            "food_id": food.id,
            "food": { "name": food.name },
            "qty": qty,
            "price": food.price,
            "subtotal": food.price * i64::from(qty),
        }))
    }
}

#[async_trait]
impl ResourceApi for FakeBackend {
    async fn fetch_list<R: Resource>(&self) -> ClientResult<Vec<R>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.record(format!("GET {}", R::KIND.path()));
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("backend unavailable".to_string()));
        }
        Ok(self.list::<R>())
    }

    async fn fetch_one<R: Resource>(&self, id: i64) -> ClientResult<R> {
        self.server_entity::<R>(id)
            .ok_or_else(|| ClientError::NotFound(format!("{} {id}", R::KIND.label())))
    }

    async fn create<R: Resource>(&self, fields: &R::Create) -> ClientResult<R> {
        self.record(format!("POST {}", R::KIND.path()));
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry(R::KIND.path()).or_default();
        let mut value = serde_json::to_value(fields)?;
        value["id"] = json!(Self::next_id(list));
        let entity: R = serde_json::from_value(value)?;
        list.push(serde_json::to_value(&entity)?);
        Ok(entity)
    }

    async fn update<R: Resource>(&self, id: i64, fields: &R::Update) -> ClientResult<R> {
        self.record(format!("PUT {}/{id}", R::KIND.path()));
        let patch = serde_json::to_value(fields)?;
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry(R::KIND.path()).or_default();
        let slot = list
            .iter_mut()
            .find(|v| v.get("id").and_then(Value::as_i64) == Some(id))
            .ok_or_else(|| ClientError::NotFound(format!("{} {id}", R::KIND.label())))?;
        if let (Some(target), Some(fields)) = (slot.as_object_mut(), patch.as_object()) {
            for (k, v) in fields {
                target.insert(k.clone(), v.clone());
            }
        }
        Ok(serde_json::from_value(slot.clone())?)
    }

    async fn update_status<R: Resource>(&self, id: i64, value: &R::Status) -> ClientResult<Option<R>> {
        let req = R::status_request(id, value);
        self.record(format!("{} {}", req.method, req.path));

        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            match gate.await {
                Ok(Ok(())) => {}
                Ok(Err(message)) => return Err(rejected(message)),
                Err(_) => return Err(ClientError::Internal("gate dropped".to_string())),
            }
        }
        let failure = self.status_failures.lock().unwrap().pop_front();
        if let Some(message) = failure {
            return Err(rejected(message));
        }

        let value = value.clone();
        let updated = self.modify::<R>(id, |e| e.set_status(value))?;
        Ok(Some(updated))
    }

    async fn delete<R: Resource>(&self, id: i64) -> ClientResult<()> {
        self.record(format!("DELETE {}/{id}", R::KIND.path()));
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry(R::KIND.path()).or_default();
        let before = list.len();
        list.retain(|v| v.get("id").and_then(Value::as_i64) != Some(id));
        if list.len() == before {
            return Err(ClientError::NotFound(format!("{} {id}", R::KIND.label())));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderApi for FakeBackend {
    async fn order(&self, order_id: i64) -> ClientResult<Order> {
        self.record(format!("GET orders/{order_id}"));
        self.server_entity::<Order>(order_id)
            .ok_or_else(|| ClientError::NotFound(format!("Order {order_id}")))
    }

    async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order> {
        self.record("POST orders".to_string());
        let items = order
            .items
            .iter()
            .map(|l| self.order_line(l.food_id, l.qty))
            .collect::<ClientResult<Vec<_>>>()?;
        let total: i64 = items
            .iter()
            .filter_map(|i| i.get("subtotal").and_then(Value::as_i64))
            .sum();

        self.modify::<DiningTable>(order.table_id, |t| t.status = TableStatus::Occupied)
            .map_err(|_| rejected("Table not found"))?;

        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry("orders").or_default();
        let id = Self::next_id(list);
        let value = json!({
            "id": id,
            "status": "open",
            "total_price": total,
            "table_id": order.table_id,
            "table": { "id": order.table_id, "name": format!("Table {}", order.table_id) },
            "items": items,
        });
        list.push(value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn add_order_item(&self, order_id: i64, food_id: i64, qty: u32) -> ClientResult<()> {
        self.record(format!("POST orders/{order_id}/items"));
        let line: OrderItem = serde_json::from_value(self.order_line(food_id, qty)?)?;
        self.modify_order(order_id, |order| {
            let items = order.items.get_or_insert_with(Vec::new);
            match items.iter_mut().find(|i| i.food_id == food_id) {
                Some(existing) => existing.qty += qty,
                None => items.push(line),
            }
        })
    }

    async fn set_order_item_qty(&self, order_id: i64, food_id: i64, qty: u32) -> ClientResult<()> {
        self.record(format!("PUT orders/{order_id}/items/{food_id}"));
        self.modify_order(order_id, |order| {
            if let Some(item) = order
                .items
                .get_or_insert_with(Vec::new)
                .iter_mut()
                .find(|i| i.food_id == food_id)
            {
                item.qty = qty;
            }
        })
    }

    async fn remove_order_item(&self, order_id: i64, food_id: i64) -> ClientResult<()> {
        self.record(format!("DELETE orders/{order_id}/items/{food_id}"));
        self.modify_order(order_id, |order| {
            order
                .items
                .get_or_insert_with(Vec::new)
                .retain(|i| i.food_id != food_id);
        })
    }

    async fn close_order(&self, order_id: i64) -> ClientResult<()> {
        self.record(format!("PUT orders/{order_id}/close"));
        let order = self.modify::<Order>(order_id, |o| o.status = OrderStatus::Closed)?;
        self.modify::<DiningTable>(order.table_id, |t| t.status = TableStatus::Available)
            .map(|_| ())
    }
}
