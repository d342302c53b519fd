//! Warung Client - POS client core
//!
//! HTTP access to the POS backend plus the client-side state that views
//! render from: per-resource caches with optimistic status changes, and
//! order composition for a table.

pub mod api;
pub mod cache;
pub mod composer;
pub mod config;
pub mod draft;
pub mod error;
pub mod http;
pub mod mutator;
pub mod notify;
pub mod poller;
pub mod resource;
pub mod session;

pub use api::{OrderApi, ResourceApi};
pub use cache::{LoadState, RefreshOutcome, RefreshTicket, ResourceCache, Subscription};
pub use composer::{ComposerState, OrderComposer};
pub use config::ClientConfig;
pub use draft::{DraftOrder, DraftOrderItem};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use http::HttpClient;
pub use mutator::{OptimisticMutator, PendingMutation};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use poller::Poller;
pub use resource::{Resource, ResourceKind, StatusRequest};
pub use session::{Cached, Caches, MutationOutcome, PosSession, ResourceOp};

// Re-export shared types for convenience
pub use shared::client::{LoginResponse, RegisterResponse, UserInfo};
pub use shared::{DiningTable, Food, Order, OrderItem, OrderStatus, TableStatus};
