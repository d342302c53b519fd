//! Order composition for one table
//!
//! A composer starts in `Draft`, collecting lines locally. As soon as a
//! server order exists (submitted from the draft, or discovered for the
//! table) it is `Bound` and every item change goes to the server. Draft
//! lines are never merged into a server order: binding to an existing
//! order drops them. `Closed` is terminal.

use crate::api::OrderApi;
use crate::draft::DraftOrder;
use crate::{ClientError, ClientResult};
use shared::models::OrderCreate;
use shared::{Food, Order, OrderStatus};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum ComposerState {
    /// No server order yet
    Draft(DraftOrder),
    /// Server order known; holds the last fetched copy
    Bound(Order),
    /// Order closed; no further changes
    Closed(Order),
}

/// Page-level order builder for a single table
#[derive(Debug)]
pub struct OrderComposer<A> {
    api: Arc<A>,
    table_id: i64,
    state: ComposerState,
}

impl<A: OrderApi> OrderComposer<A> {
    /// Start an empty draft for `table_id`
    pub fn new(api: Arc<A>, table_id: i64) -> Self {
        Self {
            api,
            table_id,
            state: ComposerState::Draft(DraftOrder::new()),
        }
    }

    /// Bind straight to an existing server order
    pub async fn resume(api: Arc<A>, table_id: i64, order_id: i64) -> ClientResult<Self> {
        let order = api.order(order_id).await?;
        let mut composer = Self::new(api, table_id);
        composer.bind(order);
        Ok(composer)
    }

    pub fn table_id(&self) -> i64 {
        self.table_id
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, ComposerState::Bound(_))
    }

    pub fn draft(&self) -> Option<&DraftOrder> {
        match &self.state {
            ComposerState::Draft(d) => Some(d),
            _ => None,
        }
    }

    pub fn order(&self) -> Option<&Order> {
        match &self.state {
            ComposerState::Draft(_) => None,
            ComposerState::Bound(o) | ComposerState::Closed(o) => Some(o),
        }
    }

    pub fn order_id(&self) -> Option<i64> {
        self.order().map(|o| o.id)
    }

    /// Draft subtotal sum, or the server's total once bound
    pub fn total(&self) -> i64 {
        match &self.state {
            ComposerState::Draft(d) => d.total(),
            ComposerState::Bound(o) | ComposerState::Closed(o) => o.total_price,
        }
    }

    /// Adopt a server order
    ///
    /// Any draft lines are discarded. A closed order moves straight to
    /// `Closed`; a composer that is already closed ignores the call.
    pub fn bind(&mut self, order: Order) {
        match &self.state {
            ComposerState::Closed(_) => {
                tracing::debug!(order_id = order.id, "Composer closed; ignoring bind");
                return;
            }
            ComposerState::Draft(d) if !d.is_empty() => {
                tracing::warn!(
                    table_id = self.table_id,
                    order_id = order.id,
                    dropped = d.items().len(),
                    "Server order found; discarding draft lines"
                );
            }
            ComposerState::Bound(current) if current.id != order.id => {
                tracing::warn!(from = current.id, to = order.id, "Rebinding composer to another order");
            }
            _ => {}
        }
        self.state = if order.status == OrderStatus::Closed {
            ComposerState::Closed(order)
        } else {
            ComposerState::Bound(order)
        };
    }

    fn bound_id(&self) -> ClientResult<i64> {
        match &self.state {
            ComposerState::Bound(o) => Ok(o.id),
            ComposerState::Closed(o) => Err(ClientError::Validation(format!(
                "Order #{} is already closed",
                o.id
            ))),
            ComposerState::Draft(_) => {
                Err(ClientError::Validation("No active order".to_string()))
            }
        }
    }

    /// Refetch the bound order
    pub async fn reload(&mut self) -> ClientResult<()> {
        let id = self.bound_id()?;
        let order = self.api.order(id).await?;
        self.bind(order);
        Ok(())
    }

    /// Add one of `food`
    pub async fn add_item(&mut self, food: &Food) -> ClientResult<()> {
        if let ComposerState::Draft(d) = &mut self.state {
            d.add_item(food);
            return Ok(());
        }
        let id = self.bound_id()?;
        self.api.add_order_item(id, food.id, 1).await?;
        tracing::info!(order_id = id, food_id = food.id, "Item added to order");
        self.reload().await
    }

    /// Adjust a line's quantity by `delta`, removing it at 0
    pub async fn change_quantity(&mut self, food_id: i64, delta: i64) -> ClientResult<()> {
        if let ComposerState::Draft(d) = &mut self.state {
            d.change_quantity(food_id, delta);
            return Ok(());
        }
        let id = self.bound_id()?;
        let current = self
            .order()
            .and_then(|o| o.items().iter().find(|i| i.food_id == food_id))
            .map(|i| i64::from(i.qty));

        match current {
            Some(qty) => {
                let new_qty = (qty + delta).max(0);
                if new_qty == 0 {
                    self.api.remove_order_item(id, food_id).await?;
                } else {
                    let new_qty = u32::try_from(new_qty).unwrap_or(u32::MAX);
                    self.api.set_order_item_qty(id, food_id, new_qty).await?;
                }
            }
            None if delta > 0 => {
                let qty = u32::try_from(delta).unwrap_or(u32::MAX);
                self.api.add_order_item(id, food_id, qty).await?;
            }
            None => return Ok(()),
        }
        self.reload().await
    }

    /// Remove a line entirely
    pub async fn remove_item(&mut self, food_id: i64) -> ClientResult<()> {
        if let ComposerState::Draft(d) = &mut self.state {
            d.remove_item(food_id);
            return Ok(());
        }
        let id = self.bound_id()?;
        self.api.remove_order_item(id, food_id).await?;
        self.reload().await
    }

    /// Create the server order from the draft and bind to it
    pub async fn submit(&mut self) -> ClientResult<&Order> {
        let lines = match &self.state {
            ComposerState::Draft(d) if d.is_empty() => {
                return Err(ClientError::Validation("Order has no items".to_string()));
            }
            ComposerState::Draft(d) => d.lines(),
            _ => return Err(ClientError::Validation("Order already submitted".to_string())),
        };
        let order = self
            .api
            .create_order(&OrderCreate {
                table_id: self.table_id,
                items: lines,
            })
            .await?;
        tracing::info!(table_id = self.table_id, order_id = order.id, "Order created");
        // Submitted lines live on the server now; nothing is discarded.
        self.state = ComposerState::Bound(order);
        self.order()
            .ok_or_else(|| ClientError::Internal("Order missing after submit".to_string()))
    }

    /// Close the bound order
    pub async fn close(&mut self) -> ClientResult<()> {
        let id = match &self.state {
            ComposerState::Draft(_) => {
                return Err(ClientError::Validation("No active order to close".to_string()));
            }
            _ => self.bound_id()?,
        };
        self.api.close_order(id).await?;
        tracing::info!(order_id = id, "Order closed");
        let order = match self.api.order(id).await {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(order_id = id, error = %e, "Reload after close failed");
                let mut order = self
                    .order()
                    .cloned()
                    .ok_or_else(|| ClientError::Internal("Order missing after close".to_string()))?;
                order.status = OrderStatus::Closed;
                order
            }
        };
        self.state = ComposerState::Closed(order);
        Ok(())
    }
}
