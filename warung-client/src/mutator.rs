//! Optimistic Mutator
//!
//! Writes the intended status into the cache before the server confirms
//! it, then either resyncs from the server or restores the snapshot taken
//! just before the write.
//!
//! Two mutations on the same id do not coordinate. The second snapshot is
//! taken from the first's optimistic cache, so rolling back the second
//! restores the first's value and not the server's. A rollback only lands
//! while the entity still shows the failed mutation's own value: when the
//! first fails after the second has written, the second's value stays.

use crate::api::ResourceApi;
use crate::cache::ResourceCache;
use crate::resource::Resource;
use crate::ClientResult;
use std::sync::Arc;

/// One in-flight optimistic write
///
/// Holds the cache's in-flight slot until settled or dropped, which keeps
/// background refreshes from overwriting the optimistic value.
#[derive(Debug)]
pub struct PendingMutation<R: Resource> {
    cache: Arc<ResourceCache<R>>,
    id: i64,
    value: R::Status,
    snapshot: Vec<R>,
    released: bool,
}

impl<R: Resource> PendingMutation<R> {
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The value written optimistically
    pub fn value(&self) -> &R::Status {
        &self.value
    }

    /// Cache contents immediately before the optimistic write
    pub fn snapshot(&self) -> &[R] {
        &self.snapshot
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.cache.end_mutation();
        }
    }
}

impl<R: Resource> Drop for PendingMutation<R> {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(resource = %R::KIND, id = self.id, "Pending mutation dropped unsettled");
            self.release();
        }
    }
}

/// Status changes on one resource with optimistic cache writes
#[derive(Debug)]
pub struct OptimisticMutator<R: Resource, A> {
    cache: Arc<ResourceCache<R>>,
    api: Arc<A>,
}

impl<R: Resource, A> Clone for OptimisticMutator<R, A> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            api: self.api.clone(),
        }
    }
}

impl<R: Resource, A: ResourceApi> OptimisticMutator<R, A> {
    pub fn new(cache: Arc<ResourceCache<R>>, api: Arc<A>) -> Self {
        Self { cache, api }
    }

    pub fn cache(&self) -> &Arc<ResourceCache<R>> {
        &self.cache
    }

    /// Write `value` optimistically and remember what was there before
    ///
    /// Outstanding refresh tickets go stale here.
    pub fn begin(&self, id: i64, value: R::Status) -> PendingMutation<R> {
        self.cache.begin_mutation();
        let snapshot = self.cache.get();
        if !self.cache.patch(id, value.clone()) {
            tracing::debug!(resource = %R::KIND, id, "Optimistic target not cached");
        }
        PendingMutation {
            cache: self.cache.clone(),
            id,
            value,
            snapshot,
            released: false,
        }
    }

    /// Resolve a pending mutation with the remote call's result
    ///
    /// Success resyncs from the server (unless another mutation on this
    /// cache is still in flight); failure restores the snapshot and hands
    /// the error back for the caller to surface.
    pub async fn settle<T>(
        &self,
        mut pending: PendingMutation<R>,
        result: ClientResult<T>,
    ) -> ClientResult<()> {
        match result {
            Ok(_) => {
                pending.release();
                tracing::info!(resource = %R::KIND, id = pending.id, value = ?pending.value, "Status change confirmed");
                if let Err(e) = self.cache.refresh(self.api.as_ref()).await {
                    // Server accepted the write; keep the optimistic value.
                    tracing::warn!(resource = %R::KIND, error = %e, "Resync after mutation failed");
                }
                Ok(())
            }
            Err(e) => {
                let restored = self.cache.rollback(pending.id, &pending.value, &pending.snapshot);
                pending.release();
                tracing::warn!(resource = %R::KIND, id = pending.id, restored, error = %e, "Status change rolled back");
                Err(e)
            }
        }
    }

    /// Optimistically change the status of `id` and persist it
    pub async fn apply(&self, id: i64, value: R::Status) -> ClientResult<()> {
        let pending = self.begin(id, value);
        let result = self.api.update_status::<R>(id, pending.value()).await;
        self.settle(pending, result).await
    }
}
