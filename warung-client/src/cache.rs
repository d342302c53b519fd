//! Resource Cache
//!
//! In-memory, keyed snapshot of one entity list. Writes are synchronous and
//! immediately visible to the next read; views observe changes through a
//! [`Subscription`].
//!
//! Background refreshes go through a [`RefreshTicket`] taken before the
//! network call. A ticket goes stale when a mutation starts or finishes on
//! this cache, and a stale or mid-mutation commit is dropped, so a refetch
//! that raced an optimistic write can never clobber it.

use crate::api::ResourceApi;
use crate::resource::Resource;
use crate::{ClientError, ClientResult};
use std::collections::HashMap;
use tokio::sync::watch;

/// Fetch state of a cached list, for loading and error views
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Never fetched
    #[default]
    Idle,
    /// First fetch in progress
    Loading,
    /// Last fetch succeeded
    Ready,
    /// Last fetch failed; items keep their previous value
    Failed(String),
}

#[derive(Debug, Clone)]
struct CacheState<R> {
    items: Vec<R>,
    load: LoadState,
    epoch: u64,
    in_flight: usize,
}

/// Permission to commit one fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    epoch: u64,
}

/// Result of a ticketed refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Fetched list replaced the cache
    Applied,
    /// A mutation started or was in flight; the fetched list was dropped
    Superseded,
}

/// Keyed entity list shared by every view of one resource
#[derive(Debug)]
pub struct ResourceCache<R: Resource> {
    tx: watch::Sender<CacheState<R>>,
}

impl<R: Resource> Default for ResourceCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep the first position of each id, with the last value seen for it.
fn dedupe<R: Resource>(items: Vec<R>) -> Vec<R> {
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(items.len());
    let mut out: Vec<R> = Vec::with_capacity(items.len());
    for item in items {
        match index.get(&item.id()) {
            Some(&pos) => out[pos] = item,
            None => {
                index.insert(item.id(), out.len());
                out.push(item);
            }
        }
    }
    out
}

impl<R: Resource> ResourceCache<R> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(CacheState {
            items: Vec::new(),
            load: LoadState::Idle,
            epoch: 0,
            in_flight: 0,
        });
        Self { tx }
    }

    /// Cache pre-filled with a fetched list
    pub fn with_items(items: Vec<R>) -> Self {
        let cache = Self::new();
        cache.tx.send_modify(|state| {
            state.items = dedupe(items);
            state.load = LoadState::Ready;
        });
        cache
    }

    // ========== Reads ==========

    /// Current list, in fetch order
    pub fn get(&self) -> Vec<R> {
        self.tx.borrow().items.clone()
    }

    pub fn find(&self, id: i64) -> Option<R> {
        self.tx.borrow().items.iter().find(|e| e.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().items.is_empty()
    }

    pub fn load_state(&self) -> LoadState {
        self.tx.borrow().load.clone()
    }

    /// Number of optimistic mutations awaiting their remote call
    pub fn in_flight(&self) -> usize {
        self.tx.borrow().in_flight
    }

    pub fn subscribe(&self) -> Subscription<R> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    // ========== Writes ==========

    /// Replace the whole list
    pub fn set(&self, items: Vec<R>) {
        let items = dedupe(items);
        tracing::debug!(resource = %R::KIND, len = items.len(), "Cache set");
        self.tx.send_modify(|state| state.items = items);
    }

    /// Overwrite the optimistic field of one entity
    ///
    /// Returns `false` (and changes nothing) when the id is not cached.
    pub fn patch(&self, id: i64, value: R::Status) -> bool {
        self.tx.send_if_modified(|state| {
            match state.items.iter_mut().find(|e| e.id() == id) {
                Some(entity) => {
                    tracing::debug!(resource = %R::KIND, id, field = R::STATUS_FIELD, value = ?value, "Cache patch");
                    entity.set_status(value);
                    true
                }
                None => false,
            }
        })
    }

    /// Undo one optimistic write from its pre-write snapshot
    ///
    /// Only the target entity is restored, and only while it still holds
    /// `written`. A later write to the same id stays in place. Commits are
    /// held off while a mutation is in flight, so with a single mutation
    /// this leaves the list exactly as the snapshot.
    pub(crate) fn rollback(&self, id: i64, written: &R::Status, snapshot: &[R]) -> bool {
        let Some(previous) = snapshot.iter().find(|e| e.id() == id) else {
            return false;
        };
        let restored = self.tx.send_if_modified(|state| {
            match state.items.iter_mut().find(|e| e.id() == id) {
                Some(slot) if slot.status() == *written && slot != previous => {
                    *slot = previous.clone();
                    true
                }
                _ => false,
            }
        });
        tracing::debug!(resource = %R::KIND, id, restored, "Cache rollback");
        restored
    }

    // ========== Ticketed refresh ==========

    pub fn ticket(&self) -> RefreshTicket {
        RefreshTicket {
            epoch: self.tx.borrow().epoch,
        }
    }

    /// Mark a fetch as started; only an idle cache switches to `Loading`.
    fn mark_loading(&self) {
        self.tx.send_if_modified(|state| {
            if matches!(state.load, LoadState::Idle) {
                state.load = LoadState::Loading;
                true
            } else {
                false
            }
        });
    }

    /// Commit a fetched list if the ticket is still current
    pub fn commit(&self, ticket: RefreshTicket, items: Vec<R>) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::Superseded;
        self.tx.send_if_modified(|state| {
            if state.epoch != ticket.epoch || state.in_flight > 0 {
                return false;
            }
            state.items = dedupe(items);
            state.load = LoadState::Ready;
            outcome = RefreshOutcome::Applied;
            true
        });
        if outcome == RefreshOutcome::Superseded {
            tracing::debug!(resource = %R::KIND, "Dropped stale refresh");
        }
        outcome
    }

    /// Record a failed fetch if the ticket is still current
    pub fn fail(&self, ticket: RefreshTicket, message: impl Into<String>) -> RefreshOutcome {
        let message = message.into();
        let mut outcome = RefreshOutcome::Superseded;
        self.tx.send_if_modified(|state| {
            if state.epoch != ticket.epoch || state.in_flight > 0 {
                return false;
            }
            state.load = LoadState::Failed(message);
            outcome = RefreshOutcome::Applied;
            true
        });
        outcome
    }

    /// Fetch the list from the server and commit it
    pub async fn refresh<A: ResourceApi + ?Sized>(&self, api: &A) -> ClientResult<RefreshOutcome> {
        let ticket = self.ticket();
        self.mark_loading();
        match api.fetch_list::<R>().await {
            Ok(items) => Ok(self.commit(ticket, items)),
            Err(e) => {
                self.fail(ticket, e.user_message());
                Err(e)
            }
        }
    }

    // ========== Mutation bookkeeping ==========

    /// Invalidate outstanding tickets and hold off commits
    pub(crate) fn begin_mutation(&self) {
        self.tx.send_if_modified(|state| {
            state.epoch += 1;
            state.in_flight += 1;
            false
        });
    }

    pub(crate) fn end_mutation(&self) {
        self.tx.send_if_modified(|state| {
            state.epoch += 1;
            state.in_flight = state.in_flight.saturating_sub(1);
            false
        });
    }
}

/// Reactive read handle held by a view
#[derive(Debug, Clone)]
pub struct Subscription<R: Resource> {
    rx: watch::Receiver<CacheState<R>>,
}

impl<R: Resource> Subscription<R> {
    /// Current list, marking it seen
    pub fn current(&mut self) -> Vec<R> {
        self.rx.borrow_and_update().items.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.rx.borrow().load.clone()
    }

    /// Wait until the list or load state changes
    pub async fn changed(&mut self) -> ClientResult<()> {
        self.rx
            .changed()
            .await
            .map_err(|_| ClientError::Internal(format!("{} cache dropped", R::KIND)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Food;

    fn food(id: i64, is_active: bool) -> Food {
        Food {
            id,
            name: format!("Food {id}"),
            description: None,
            category: None,
            price: 10_000,
            is_active,
        }
    }

    #[test]
    fn test_set_is_visible_to_next_get() {
        let cache = ResourceCache::<Food>::new();
        assert!(cache.is_empty());
        cache.set(vec![food(1, true), food(2, false)]);
        assert_eq!(cache.get(), vec![food(1, true), food(2, false)]);
    }

    #[test]
    fn test_set_keeps_one_entry_per_id() {
        let cache = ResourceCache::<Food>::new();
        cache.set(vec![food(1, true), food(2, true), food(1, false)]);
        assert_eq!(cache.get(), vec![food(1, false), food(2, true)]);
    }

    #[test]
    fn test_patch_absent_id_is_noop() {
        let cache = ResourceCache::with_items(vec![food(1, true)]);
        let mut sub = cache.subscribe();
        let _ = sub.current();

        assert!(!cache.patch(42, false));
        assert_eq!(cache.get(), vec![food(1, true)]);
        assert!(!sub.rx.has_changed().unwrap());

        assert!(cache.patch(1, false));
        assert_eq!(cache.find(1), Some(food(1, false)));
        assert!(sub.rx.has_changed().unwrap());
    }

    #[test]
    fn test_ticket_goes_stale_when_mutation_begins() {
        let cache = ResourceCache::with_items(vec![food(1, true)]);
        let ticket = cache.ticket();

        cache.begin_mutation();
        cache.patch(1, false);
        assert_eq!(cache.commit(ticket, vec![food(1, true)]), RefreshOutcome::Superseded);
        assert_eq!(cache.find(1), Some(food(1, false)));

        // A ticket taken mid-mutation is also held off.
        let mid = cache.ticket();
        assert_eq!(cache.commit(mid, vec![food(1, true)]), RefreshOutcome::Superseded);

        cache.end_mutation();
        let after = cache.ticket();
        assert_eq!(cache.commit(after, vec![food(1, false)]), RefreshOutcome::Applied);
        assert_eq!(cache.in_flight(), 0);
    }

    #[test]
    fn test_rollback_only_touches_target() {
        let cache = ResourceCache::with_items(vec![food(1, true), food(2, true)]);
        let snapshot = cache.get();
        cache.patch(1, false);
        cache.patch(2, false);

        assert!(cache.rollback(1, &false, &snapshot));
        assert_eq!(cache.get(), vec![food(1, true), food(2, false)]);

        // Absent from the snapshot means the write never landed.
        assert!(!cache.rollback(3, &false, &snapshot));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_rollback_keeps_later_write() {
        let cache = ResourceCache::with_items(vec![food(1, true)]);
        let snapshot = cache.get();
        cache.patch(1, false);
        // Overwritten by a newer mutation before this one failed.
        cache.patch(1, true);
        let mut changed = food(1, true);
        changed.name = "Renamed".to_string();
        cache.set(vec![changed.clone()]);

        assert!(!cache.rollback(1, &false, &snapshot));
        assert_eq!(cache.find(1), Some(changed));
    }

    #[test]
    fn test_failed_fetch_keeps_items() {
        let cache = ResourceCache::with_items(vec![food(1, true)]);
        let ticket = cache.ticket();
        assert_eq!(cache.fail(ticket, "Something went wrong!"), RefreshOutcome::Applied);
        assert_eq!(cache.load_state(), LoadState::Failed("Something went wrong!".into()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_only_idle_cache_shows_loading() {
        let cache = ResourceCache::<Food>::new();
        cache.mark_loading();
        assert_eq!(cache.load_state(), LoadState::Loading);

        let ready = ResourceCache::with_items(vec![food(1, true)]);
        ready.mark_loading();
        assert_eq!(ready.load_state(), LoadState::Ready);
    }
}
