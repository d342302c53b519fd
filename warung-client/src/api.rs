//! Backend API seams
//!
//! The reconciliation core only talks to the backend through these traits.
//! [`HttpClient`] implements them over REST; tests implement them in memory.

use crate::resource::Resource;
use crate::{ClientResult, HttpClient};
use async_trait::async_trait;
use reqwest::Method;
use shared::Order;
use shared::models::{OrderCreate, OrderItemQtyUpdate, OrderLineInput};

/// Generic list/CRUD/status operations over a [`Resource`]
#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn fetch_list<R: Resource>(&self) -> ClientResult<Vec<R>>;

    async fn fetch_one<R: Resource>(&self, id: i64) -> ClientResult<R>;

    async fn create<R: Resource>(&self, fields: &R::Create) -> ClientResult<R>;

    async fn update<R: Resource>(&self, id: i64, fields: &R::Update) -> ClientResult<R>;

    /// Persist a new optimistic-field value
    ///
    /// Returns the entity when the server echoes it back.
    async fn update_status<R: Resource>(&self, id: i64, value: &R::Status) -> ClientResult<Option<R>>;

    async fn delete<R: Resource>(&self, id: i64) -> ClientResult<()>;
}

/// Server-side order and order-item operations
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn order(&self, order_id: i64) -> ClientResult<Order>;

    async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order>;

    async fn add_order_item(&self, order_id: i64, food_id: i64, qty: u32) -> ClientResult<()>;

    async fn set_order_item_qty(&self, order_id: i64, food_id: i64, qty: u32) -> ClientResult<()>;

    async fn remove_order_item(&self, order_id: i64, food_id: i64) -> ClientResult<()>;

    async fn close_order(&self, order_id: i64) -> ClientResult<()>;
}

#[async_trait]
impl ResourceApi for HttpClient {
    async fn fetch_list<R: Resource>(&self) -> ClientResult<Vec<R>> {
        self.get_list(R::KIND.path()).await
    }

    async fn fetch_one<R: Resource>(&self, id: i64) -> ClientResult<R> {
        self.get_entity(&format!("{}/{}", R::KIND.path(), id)).await
    }

    async fn create<R: Resource>(&self, fields: &R::Create) -> ClientResult<R> {
        self.send_entity(Method::POST, R::KIND.path(), fields).await
    }

    async fn update<R: Resource>(&self, id: i64, fields: &R::Update) -> ClientResult<R> {
        self.send_entity(Method::PUT, &format!("{}/{}", R::KIND.path(), id), fields)
            .await
    }

    async fn update_status<R: Resource>(&self, id: i64, value: &R::Status) -> ClientResult<Option<R>> {
        let req = R::status_request(id, value);
        let body = (!req.body.is_null()).then_some(&req.body);
        self.send_lenient(req.method, &req.path, body).await
    }

    async fn delete<R: Resource>(&self, id: i64) -> ClientResult<()> {
        HttpClient::delete(self, &format!("{}/{}", R::KIND.path(), id)).await
    }
}

#[async_trait]
impl OrderApi for HttpClient {
    async fn order(&self, order_id: i64) -> ClientResult<Order> {
        self.get_entity(&format!("orders/{order_id}")).await
    }

    async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order> {
        self.send_entity(Method::POST, "orders", order).await
    }

    async fn add_order_item(&self, order_id: i64, food_id: i64, qty: u32) -> ClientResult<()> {
        let body = OrderLineInput { food_id, qty };
        self.send_lenient::<serde_json::Value, _>(
            Method::POST,
            &format!("orders/{order_id}/items"),
            Some(&body),
        )
        .await
        .map(|_| ())
    }

    async fn set_order_item_qty(&self, order_id: i64, food_id: i64, qty: u32) -> ClientResult<()> {
        let body = OrderItemQtyUpdate { qty };
        self.send_lenient::<serde_json::Value, _>(
            Method::PUT,
            &format!("orders/{order_id}/items/{food_id}"),
            Some(&body),
        )
        .await
        .map(|_| ())
    }

    async fn remove_order_item(&self, order_id: i64, food_id: i64) -> ClientResult<()> {
        HttpClient::delete(self, &format!("orders/{order_id}/items/{food_id}")).await
    }

    async fn close_order(&self, order_id: i64) -> ClientResult<()> {
        // Backend expects an empty JSON object.
        self.send_lenient::<serde_json::Value, _>(
            Method::PUT,
            &format!("orders/{order_id}/close"),
            Some(&serde_json::json!({})),
        )
        .await
        .map(|_| ())
    }
}
