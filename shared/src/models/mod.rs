//! Data models
//!
//! Shared between the backend and the POS client (via API).
//! All IDs are `i64`. Prices are whole currency units (IDR).

pub mod dining_table;
pub mod food;
pub mod order;

// Re-exports
pub use dining_table::*;
pub use food::*;
pub use order::*;
