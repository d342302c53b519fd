//! View-facing session
//!
//! `PosSession` owns one cache per resource and is what a view layer
//! holds: it hands out subscriptions, runs mutations (optimistically for
//! status changes), and turns outcomes into notifications.

use crate::api::{OrderApi, ResourceApi};
use crate::cache::{RefreshOutcome, ResourceCache, Subscription};
use crate::composer::OrderComposer;
use crate::error::ErrorKind;
use crate::mutator::OptimisticMutator;
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::poller::Poller;
use crate::resource::{Resource, ResourceKind};
use crate::{ClientConfig, ClientError, ClientResult};
use shared::{DiningTable, Food, Order};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The per-resource caches of a session
#[derive(Debug, Default)]
pub struct Caches {
    pub foods: Arc<ResourceCache<Food>>,
    pub orders: Arc<ResourceCache<Order>>,
    pub tables: Arc<ResourceCache<DiningTable>>,
}

/// A resource with a cache slot in [`Caches`]
pub trait Cached: Resource {
    fn slot(caches: &Caches) -> &Arc<ResourceCache<Self>>;
}

impl Cached for Food {
    fn slot(caches: &Caches) -> &Arc<ResourceCache<Self>> {
        &caches.foods
    }
}

impl Cached for Order {
    fn slot(caches: &Caches) -> &Arc<ResourceCache<Self>> {
        &caches.orders
    }
}

impl Cached for DiningTable {
    fn slot(caches: &Caches) -> &Arc<ResourceCache<Self>> {
        &caches.tables
    }
}

/// A mutation requested by a view
#[derive(Debug)]
pub enum ResourceOp<R: Resource> {
    Create(R::Create),
    Update(i64, R::Update),
    Delete(i64),
    /// Optimistic change of the resource's status field
    SetStatus(i64, R::Status),
}

impl<R: Resource> ResourceOp<R> {
    fn success_message(&self) -> String {
        let label = R::KIND.label();
        match self {
            Self::Create(_) => format!("{label} created successfully"),
            Self::Update(..) => format!("{label} updated successfully"),
            Self::Delete(_) => format!("{label} deleted successfully"),
            Self::SetStatus(..) => format!("{label} status updated"),
        }
    }
}

/// What a view shows after a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Success { message: String },
    Failure { kind: ErrorKind, message: String },
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message } | Self::Failure { message, .. } => message,
        }
    }

    fn notification(&self) -> Notification {
        match self {
            Self::Success { message } => Notification::success(message.clone()),
            Self::Failure { message, .. } => Notification::error(message.clone()),
        }
    }
}

/// Everything a POS view needs from the client core
pub struct PosSession<A> {
    api: Arc<A>,
    caches: Caches,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    shutdown: CancellationToken,
    pollers: Vec<Poller>,
}

impl<A> std::fmt::Debug for PosSession<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosSession")
            .field("poll_interval", &self.poll_interval)
            .field("pollers", &self.pollers.len())
            .finish_non_exhaustive()
    }
}

impl<A> PosSession<A>
where
    A: ResourceApi + OrderApi + 'static,
{
    pub fn new(api: A, config: &ClientConfig) -> Self {
        Self {
            api: Arc::new(api),
            caches: Caches::default(),
            notifier: Arc::new(TracingNotifier),
            poll_interval: config.poll_interval,
            shutdown: CancellationToken::new(),
            pollers: Vec::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    pub fn cache<R: Cached>(&self) -> &Arc<ResourceCache<R>> {
        R::slot(&self.caches)
    }

    /// Reactive view of one resource list
    pub fn subscribe<R: Cached>(&self) -> Subscription<R> {
        self.cache::<R>().subscribe()
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Cached foods matching the menu picker's category and search
    pub fn menu(&self, category: Option<&str>, search: &str) -> Vec<Food> {
        self.caches
            .foods
            .get()
            .into_iter()
            .filter(|f| f.matches(category, search))
            .collect()
    }

    // ========== Fetching ==========

    /// Refetch one list; also the retry behind a failed-load view
    pub async fn refresh<R: Cached>(&self) -> ClientResult<RefreshOutcome> {
        self.cache::<R>().refresh(self.api.as_ref()).await
    }

    async fn refresh_kind(&self, kind: ResourceKind) {
        let result = match kind {
            ResourceKind::Foods => self.refresh::<Food>().await,
            ResourceKind::Orders => self.refresh::<Order>().await,
            ResourceKind::Tables => self.refresh::<DiningTable>().await,
        };
        if let Err(e) = result {
            tracing::warn!(resource = %kind, error = %e, "Dependent refresh failed");
        }
    }

    /// Start background polling of every list
    pub fn start_polling(&mut self) {
        if !self.pollers.is_empty() {
            return;
        }
        let every = self.poll_interval;
        self.pollers = vec![
            self.poller(self.caches.foods.clone(), every),
            self.poller(self.caches.orders.clone(), every),
            self.poller(self.caches.tables.clone(), every),
        ];
        tracing::info!(?every, "Polling started");
    }

    fn poller<R: Resource>(&self, cache: Arc<ResourceCache<R>>, every: Duration) -> Poller {
        Poller::spawn_with_token(cache, self.api.clone(), every, self.shutdown.clone())
    }

    /// Stop all pollers and wait for them
    pub async fn stop_polling(&mut self) {
        self.shutdown.cancel();
        for poller in self.pollers.drain(..) {
            poller.stop().await;
        }
        self.shutdown = CancellationToken::new();
    }

    // ========== Mutations ==========

    /// Run a mutation and notify its outcome
    pub async fn mutate<R: Cached>(&self, op: ResourceOp<R>) -> MutationOutcome {
        let success = op.success_message();
        let is_status = matches!(op, ResourceOp::SetStatus(..));
        let outcome = match self.run(op).await {
            Ok(()) => {
                if is_status {
                    for kind in R::KIND.dependents() {
                        self.refresh_kind(*kind).await;
                    }
                }
                MutationOutcome::Success { message: success }
            }
            Err(e) => MutationOutcome::Failure {
                kind: e.kind(),
                message: e.user_message(),
            },
        };
        self.notify(outcome.notification());
        outcome
    }

    async fn run<R: Cached>(&self, op: ResourceOp<R>) -> ClientResult<()> {
        let cache = self.cache::<R>().clone();
        let api = self.api.as_ref();
        match op {
            ResourceOp::SetStatus(id, value) => {
                let mutator = OptimisticMutator::new(cache, self.api.clone());
                // Own task, so the rollback still lands if the view goes away.
                tokio::spawn(async move { mutator.apply(id, value).await })
                    .await
                    .map_err(|e| ClientError::Internal(format!("Mutation task failed: {e}")))?
            }
            ResourceOp::Create(fields) => {
                let created = api.create::<R>(&fields).await?;
                tracing::info!(resource = %R::KIND, id = created.id(), "Created");
                Self::resync(&cache, api).await;
                Ok(())
            }
            ResourceOp::Update(id, fields) => {
                api.update::<R>(id, &fields).await?;
                tracing::info!(resource = %R::KIND, id, "Updated");
                Self::resync(&cache, api).await;
                Ok(())
            }
            ResourceOp::Delete(id) => {
                api.delete::<R>(id).await?;
                tracing::info!(resource = %R::KIND, id, "Deleted");
                Self::resync(&cache, api).await;
                Ok(())
            }
        }
    }

    async fn resync<R: Resource>(cache: &ResourceCache<R>, api: &A) {
        if let Err(e) = cache.refresh(api).await {
            tracing::warn!(resource = %R::KIND, error = %e, "Resync after mutation failed");
        }
    }

    // ========== Order composition ==========

    /// Empty draft for a table with no open order
    pub fn compose(&self, table_id: i64) -> OrderComposer<A> {
        OrderComposer::new(self.api.clone(), table_id)
    }

    /// Composer for a table, bound to its open order if it has one
    ///
    /// Uses the cached order list to find the open order.
    pub async fn compose_for_table(&self, table_id: i64) -> ClientResult<OrderComposer<A>> {
        let open = self
            .caches
            .orders
            .get()
            .into_iter()
            .find(|o| o.table_id == table_id && o.status.is_open());
        match open {
            Some(order) => OrderComposer::resume(self.api.clone(), table_id, order.id).await,
            None => Ok(self.compose(table_id)),
        }
    }

    /// Add a food to an order, notifying only for server-backed orders
    pub async fn add_to_order(&self, composer: &mut OrderComposer<A>, food: &Food) -> MutationOutcome {
        let bound = composer.is_bound();
        match composer.add_item(food).await {
            Ok(()) => {
                let outcome = MutationOutcome::Success {
                    message: format!("{} added to order", food.name),
                };
                if bound {
                    self.notify(outcome.notification());
                }
                outcome
            }
            Err(e) => {
                tracing::error!(food_id = food.id, error = %e, "Error adding item");
                let outcome = MutationOutcome::Failure {
                    kind: e.kind(),
                    message: "Failed to add item".to_string(),
                };
                self.notify(outcome.notification());
                outcome
            }
        }
    }

    /// Submit a draft as a new server order
    pub async fn checkout(&self, composer: &mut OrderComposer<A>) -> MutationOutcome {
        let result = composer.submit().await.map(|o| o.id);
        let outcome = match result {
            Ok(id) => {
                self.refresh_kind(ResourceKind::Orders).await;
                self.refresh_kind(ResourceKind::Tables).await;
                MutationOutcome::Success {
                    message: format!("Order #{id} created"),
                }
            }
            Err(e) => MutationOutcome::Failure {
                kind: e.kind(),
                message: e.user_message(),
            },
        };
        self.notify(outcome.notification());
        outcome
    }

    /// Close the composer's order
    pub async fn close_order(&self, composer: &mut OrderComposer<A>) -> MutationOutcome {
        if composer.order_id().is_none() {
            self.notify(Notification::warning("No active order to close"));
            return MutationOutcome::Failure {
                kind: ErrorKind::ValidationFailure,
                message: "No active order to close".to_string(),
            };
        }
        let outcome = match composer.close().await {
            Ok(()) => {
                self.refresh_kind(ResourceKind::Orders).await;
                self.refresh_kind(ResourceKind::Tables).await;
                MutationOutcome::Success {
                    message: "Order closed successfully!".to_string(),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Error closing order");
                MutationOutcome::Failure {
                    kind: e.kind(),
                    message: "Failed to close order".to_string(),
                }
            }
        };
        self.notify(outcome.notification());
        outcome
    }
}
