//! API Response types
//!
//! Envelope shapes the backend uses. The backend is not consistent:
//! some list endpoints wrap in `{ "data": [...] }`, others return a bare
//! array, and errors carry a `{ "message": ... }` body.

use serde::{Deserialize, Serialize};

/// Wrapped response body
///
/// ```json
/// { "message": "Food created", "data": { ... } }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Human-readable message (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response data (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            message: None,
            data: Some(data),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Any of the list body shapes the backend returns
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
    Categories { categories: Vec<T> },
    Unexpected(serde_json::Value),
}

impl<T> ListBody<T> {
    /// Items of the body, or `None` when the shape was not recognised.
    pub fn into_items(self) -> Option<Vec<T>> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } | Self::Categories { categories: items } => {
                Some(items)
            }
            Self::Unexpected(_) => None,
        }
    }
}

/// Single-entity body, either bare or wrapped in `{ "data": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EntityBody<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> EntityBody<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}
