//! Shared types for the Warung POS
//!
//! Wire models and response envelopes used by the backend API and by
//! `warung-client`.

pub mod client;
pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{DiningTable, Food, Order, OrderItem, OrderStatus, TableStatus};
pub use response::{ApiResponse, EntityBody, ErrorBody, ListBody};
