use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, trace};
use trove_config::MediaConfig;
use trove_contracts::media::{FetchedPhoto, MediaSource};
use trove_model::{ListingId, StalenessToken};

use crate::error::MediaFetchError;

use super::binding::MediaBinding;
use super::staleness::StalenessRegistry;
use super::store::MediaStore;

type FetchResult = Result<FetchedPhoto, MediaFetchError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;
type FetchKey = (ListingId, StalenessToken);

struct CacheInner {
    source: Arc<dyn MediaSource>,
    store: MediaStore,
    tokens: StalenessRegistry,
    inflight: DashMap<FetchKey, SharedFetch>,
    coalesce: bool,
    next_binding: AtomicU64,
    fetches_started: AtomicU64,
}

/// Entry point of the media resource cache.
///
/// Cheap to clone. Bindings created from one cache share its store, its
/// staleness registry and, when coalescing is on, its in-flight fetches.
#[derive(Clone)]
pub struct MediaCache {
    inner: Arc<CacheInner>,
}

impl fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaCache")
            .field("source", &self.inner.source)
            .field("live_handles", &self.inner.store.live_count())
            .field("inflight", &self.inner.inflight.len())
            .field("coalesce", &self.inner.coalesce)
            .finish()
    }
}

impl MediaCache {
    pub fn new(source: Arc<dyn MediaSource>, tokens: StalenessRegistry) -> Self {
        Self::with_config(source, tokens, &MediaConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn MediaSource>,
        tokens: StalenessRegistry,
        config: &MediaConfig,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                store: MediaStore::new(),
                tokens,
                inflight: DashMap::new(),
                coalesce: config.coalesce_fetches,
                next_binding: AtomicU64::new(0),
                fetches_started: AtomicU64::new(0),
            }),
        }
    }

    /// Create the resolution state for one consuming surface.
    pub fn bind(&self) -> MediaBinding {
        let id = self.inner.next_binding.fetch_add(1, Ordering::Relaxed) + 1;
        MediaBinding::new(id, self.clone())
    }

    pub fn store(&self) -> &MediaStore {
        &self.inner.store
    }

    pub fn tokens(&self) -> &StalenessRegistry {
        &self.inner.tokens
    }

    /// Transfers actually issued against the media source.
    pub fn fetches_started(&self) -> u64 {
        self.inner.fetches_started.load(Ordering::Relaxed)
    }

    /// Fetch the photo bytes for `id`, joining an identical in-flight
    /// transfer when one exists.
    pub(crate) async fn fetch(&self, id: ListingId, token: StalenessToken) -> FetchResult {
        if !self.inner.coalesce {
            return self.start_fetch(id).await;
        }

        let key = (id, token);
        let shared = match self.inner.inflight.entry(key) {
            Entry::Occupied(entry) => {
                trace!(listing_id = %id, token = %token, "joining in-flight photo fetch");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let shared = self.start_fetch(id).shared();
                entry.insert(shared.clone());
                shared
            }
        };

        let waiter = InflightWaiter {
            inflight: &self.inner.inflight,
            key,
            shared,
            settled: false,
        };
        let transfer = waiter.shared.clone();
        let result = transfer.await;
        waiter.settle();
        result
    }

    fn start_fetch(&self, id: ListingId) -> BoxFuture<'static, FetchResult> {
        self.inner.fetches_started.fetch_add(1, Ordering::Relaxed);
        debug!(listing_id = %id, "fetching listing photo");
        let source = Arc::clone(&self.inner.source);
        async move {
            source
                .fetch_photo(id)
                .await
                .map_err(|err| MediaFetchError::from_gateway(id, err))
        }
        .boxed()
    }
}

/// One caller's interest in a coalesced fetch.
///
/// A settled fetch leaves the in-flight map. An abandoned one leaves it only
/// when no other caller is still waiting on it, so the next resolution of the
/// key starts a fresh transfer instead of joining an orphan.
struct InflightWaiter<'a> {
    inflight: &'a DashMap<FetchKey, SharedFetch>,
    key: FetchKey,
    shared: SharedFetch,
    settled: bool,
}

impl InflightWaiter<'_> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for InflightWaiter<'_> {
    fn drop(&mut self) {
        let settled = self.settled;
        let shared = &self.shared;
        // A later fetch for the same key may already have replaced ours.
        // Map entry plus this waiter's clone means nobody else is listening.
        let removed = self.inflight.remove_if(&self.key, |_, current| {
            current.ptr_eq(shared) && (settled || shared.strong_count() <= Some(2))
        });
        if removed.is_some() && !settled {
            trace!(listing_id = %self.key.0, "dropped abandoned photo fetch");
        }
    }
}
