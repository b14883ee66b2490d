use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use trove_model::{ListingId, StalenessToken};

use crate::error::MediaErrorKind;

use super::cache::MediaCache;
use super::store::MediaHandle;

/// Resolution status of one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaStatus {
    /// Nothing bound.
    #[default]
    Idle,
    /// A fetch for the current pair is outstanding.
    Loading,
    /// The snapshot carries a live handle.
    Ready,
    /// The last fetch failed; no handle is held.
    Error(MediaErrorKind),
}

/// What a binding currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaSnapshot {
    pub status: MediaStatus,
    /// Present when `Ready`. While a refreshed photo of the same listing is
    /// loading, the previous handle stays visible here.
    pub handle: Option<MediaHandle>,
    /// Pair this snapshot was resolved for.
    pub key: Option<(ListingId, StalenessToken)>,
}

impl MediaSnapshot {
    pub fn is_ready(&self) -> bool {
        self.status == MediaStatus::Ready
    }

    pub fn is_loading(&self) -> bool {
        self.status == MediaStatus::Loading
    }

    pub fn error_kind(&self) -> Option<MediaErrorKind> {
        match self.status {
            MediaStatus::Error(kind) => Some(kind),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct BindingState {
    key: Option<(ListingId, StalenessToken)>,
    generation: u64,
    current: Option<MediaHandle>,
    status: MediaStatus,
}

impl BindingState {
    fn snapshot(&self) -> MediaSnapshot {
        MediaSnapshot {
            status: self.status,
            handle: self.current.clone(),
            key: self.key,
        }
    }
}

struct BindingInner {
    id: u64,
    cache: MediaCache,
    state: Mutex<BindingState>,
    updates: watch::Sender<MediaSnapshot>,
}

impl Drop for BindingInner {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().current.take() {
            self.cache.store().release(&handle);
            debug!(binding = self.id, handle = %handle.id(), "released media on binding drop");
        }
    }
}

/// Rolls a binding back to its last published state when the resolution that
/// moved it to `Loading` is dropped before its fetch settles.
struct PendingResolve<'a> {
    inner: &'a BindingInner,
    generation: u64,
    armed: bool,
}

impl PendingResolve<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingResolve<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.inner.state.lock();
        if state.generation != self.generation {
            return;
        }
        // Forget the pair so resolving it again starts a new fetch.
        state.key = state
            .current
            .as_ref()
            .map(|handle| (handle.listing_id(), handle.token()));
        state.status = if state.current.is_some() {
            MediaStatus::Ready
        } else {
            MediaStatus::Idle
        };
        debug!(
            binding = self.inner.id,
            generation = self.generation,
            "photo resolution abandoned"
        );
        self.inner.updates.send_replace(state.snapshot());
    }
}

/// One consumer's view of a listing photo.
///
/// Clones share state. The current handle is released when the binding is
/// unbound, superseded, or when its last clone is dropped.
#[derive(Clone)]
pub struct MediaBinding {
    inner: Arc<BindingInner>,
}

impl fmt::Debug for MediaBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("MediaBinding")
            .field("id", &self.inner.id)
            .field("key", &state.key)
            .field("generation", &state.generation)
            .field("status", &state.status)
            .finish()
    }
}

impl MediaBinding {
    pub(crate) fn new(id: u64, cache: MediaCache) -> Self {
        let (updates, _) = watch::channel(MediaSnapshot::default());
        Self {
            inner: Arc::new(BindingInner {
                id,
                cache,
                state: Mutex::new(BindingState::default()),
                updates,
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn snapshot(&self) -> MediaSnapshot {
        self.inner.state.lock().snapshot()
    }

    /// Receive every status change of this binding.
    pub fn subscribe(&self) -> watch::Receiver<MediaSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Resolve the photo for `listing` at `token`.
    ///
    /// Re-resolving the last pair is a no-op returning the current snapshot,
    /// errors included; change the token to retry. Only the most recently
    /// started resolution may publish: results of superseded fetches are
    /// discarded and their handles released before anyone sees them.
    pub async fn resolve(
        &self,
        listing: Option<ListingId>,
        token: StalenessToken,
    ) -> MediaSnapshot {
        let Some(listing_id) = listing else {
            return self.unbind();
        };
        let key = (listing_id, token);

        let generation = {
            let mut state = self.inner.state.lock();
            if state.key == Some(key) {
                return state.snapshot();
            }
            state.generation += 1;

            // A different listing's photo must not linger while this one loads.
            let switching = state.key.is_none_or(|(previous, _)| previous != listing_id);
            if switching && let Some(previous) = state.current.take() {
                self.inner.cache.store().release(&previous);
            }

            state.key = Some(key);
            state.status = MediaStatus::Loading;
            self.inner.updates.send_replace(state.snapshot());
            state.generation
        };

        debug!(
            binding = self.inner.id,
            listing_id = %listing_id,
            token = %token,
            generation,
            "resolving listing photo"
        );
        let pending = PendingResolve {
            inner: &self.inner,
            generation,
            armed: true,
        };
        let result = self.inner.cache.fetch(listing_id, token).await;
        pending.disarm();

        let store = self.inner.cache.store();
        let mut state = self.inner.state.lock();
        let current = state.generation == generation;
        match result {
            Ok(photo) if !current => {
                let orphan = store.publish(listing_id, token, photo);
                store.release(&orphan);
                debug!(
                    binding = self.inner.id,
                    listing_id = %listing_id,
                    generation,
                    latest = state.generation,
                    "discarded stale photo response"
                );
                return state.snapshot();
            }
            Err(err) if !current => {
                debug!(
                    binding = self.inner.id,
                    listing_id = %listing_id,
                    generation,
                    error = %err,
                    "ignored failure of superseded photo fetch"
                );
                return state.snapshot();
            }
            Ok(photo) => {
                if let Some(previous) = state.current.take() {
                    store.release(&previous);
                }
                let handle = store.publish(listing_id, token, photo);
                debug!(
                    binding = self.inner.id,
                    listing_id = %listing_id,
                    handle = %handle.id(),
                    bytes = handle.len(),
                    "photo ready"
                );
                state.current = Some(handle);
                state.status = MediaStatus::Ready;
            }
            Err(err) => {
                warn!(
                    binding = self.inner.id,
                    listing_id = %listing_id,
                    error = %err,
                    "photo unavailable"
                );
                if let Some(previous) = state.current.take() {
                    store.release(&previous);
                }
                state.status = MediaStatus::Error(err.kind());
            }
        }

        let snapshot = state.snapshot();
        self.inner.updates.send_replace(snapshot.clone());
        snapshot
    }

    /// Resolve `listing` at the token the shared registry currently holds.
    pub async fn resolve_latest(&self, listing: ListingId) -> MediaSnapshot {
        let token = self.inner.cache.tokens().token(listing);
        self.resolve(Some(listing), token).await
    }

    /// Drive [`resolve`](Self::resolve) on the runtime without awaiting it.
    /// Progress is observable through [`subscribe`](Self::subscribe).
    pub fn spawn_resolve(
        &self,
        listing: Option<ListingId>,
        token: StalenessToken,
    ) -> JoinHandle<MediaSnapshot> {
        let binding = self.clone();
        tokio::spawn(async move { binding.resolve(listing, token).await })
    }

    /// Stop observing: in-flight fetches can no longer publish and the
    /// current handle is released.
    pub fn unbind(&self) -> MediaSnapshot {
        let mut state = self.inner.state.lock();
        state.generation += 1;
        state.key = None;
        if let Some(previous) = state.current.take() {
            self.inner.cache.store().release(&previous);
        }
        state.status = MediaStatus::Idle;
        let snapshot = state.snapshot();
        self.inner.updates.send_replace(snapshot.clone());
        snapshot
    }
}
