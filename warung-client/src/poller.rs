//! Background list polling

use crate::api::ResourceApi;
use crate::cache::{RefreshOutcome, ResourceCache};
use crate::resource::Resource;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Periodically refetches one resource into its cache
///
/// The first fetch happens immediately. Failures are logged and recorded
/// in the cache's load state; the next tick tries again.
#[derive(Debug)]
pub struct Poller {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<R, A>(cache: Arc<ResourceCache<R>>, api: Arc<A>, every: Duration) -> Self
    where
        R: Resource,
        A: ResourceApi + 'static,
    {
        Self::spawn_with_token(cache, api, every, CancellationToken::new())
    }

    /// Spawn under a parent token; cancelling the parent stops every poller
    /// spawned from it, while [`Poller::stop`] stops only this one.
    pub fn spawn_with_token<R, A>(
        cache: Arc<ResourceCache<R>>,
        api: Arc<A>,
        every: Duration,
        token: CancellationToken,
    ) -> Self
    where
        R: Resource,
        A: ResourceApi + 'static,
    {
        let token = token.child_token();
        let child = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(resource = %R::KIND, ?every, "Poller started");
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        match cache.refresh(api.as_ref()).await {
                            Ok(RefreshOutcome::Applied) => {}
                            Ok(RefreshOutcome::Superseded) => {
                                tracing::debug!(resource = %R::KIND, "Poll result superseded by mutation");
                            }
                            Err(e) => tracing::error!(resource = %R::KIND, error = %e, "Poll failed"),
                        }
                    }
                }
            }
            tracing::debug!(resource = %R::KIND, "Poller stopped");
        });
        Self { token, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel and wait for the task to exit
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Poller task ended abnormally");
        }
    }
}
