//! Draft Order Accumulator
//!
//! Line items collected for a table before any server order exists. Every
//! operation is total: unknown ids are ignored and quantities clamp at 0,
//! which removes the line.

use shared::Food;
use shared::models::OrderLineInput;

/// One draft line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOrderItem {
    pub food_id: i64,
    /// Display name captured when the line was created
    pub name: String,
    pub unit_price: i64,
    /// Always >= 1 while the line exists
    pub qty: u32,
    /// `qty * unit_price`
    pub subtotal: i64,
}

impl DraftOrderItem {
    fn new(food: &Food) -> Self {
        Self {
            food_id: food.id,
            name: food.name.clone(),
            unit_price: food.price,
            qty: 1,
            subtotal: food.price,
        }
    }

    fn set_qty(&mut self, qty: u32) {
        self.qty = qty;
        self.subtotal = i64::from(qty).saturating_mul(self.unit_price);
    }
}

/// Ordered draft lines, one per food
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftOrder {
    items: Vec<DraftOrderItem>,
}

impl DraftOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in the order they were first added
    pub fn items(&self) -> &[DraftOrderItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, food_id: i64) -> Option<&DraftOrderItem> {
        self.items.iter().find(|i| i.food_id == food_id)
    }

    /// Add one of `food`, merging into its existing line
    pub fn add_item(&mut self, food: &Food) {
        match self.items.iter_mut().find(|i| i.food_id == food.id) {
            Some(item) => item.set_qty(item.qty.saturating_add(1)),
            None => self.items.push(DraftOrderItem::new(food)),
        }
    }

    /// Adjust a line's quantity by `delta`; a result of 0 or less removes it
    pub fn change_quantity(&mut self, food_id: i64, delta: i64) {
        let Some(pos) = self.items.iter().position(|i| i.food_id == food_id) else {
            return;
        };
        let new_qty = i64::from(self.items[pos].qty).saturating_add(delta).max(0);
        if new_qty == 0 {
            self.items.remove(pos);
        } else {
            let qty = u32::try_from(new_qty).unwrap_or(u32::MAX);
            self.items[pos].set_qty(qty);
        }
    }

    pub fn remove_item(&mut self, food_id: i64) {
        self.items.retain(|i| i.food_id != food_id);
    }

    /// Sum of all subtotals
    pub fn total(&self) -> i64 {
        self.items.iter().map(|i| i.subtotal).sum()
    }

    /// Lines as a create-order payload
    pub fn lines(&self) -> Vec<OrderLineInput> {
        self.items
            .iter()
            .map(|i| OrderLineInput {
                food_id: i.food_id,
                qty: i.qty,
            })
            .collect()
    }
}
