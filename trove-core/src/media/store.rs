use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use image::ImageFormat;
use trove_contracts::media::FetchedPhoto;
use trove_model::{ListingId, StalenessToken};

/// Process-unique identity of a published handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    /// Raw id value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Renderable reference to a listing's photo bytes.
///
/// The handle itself is only a reference; the bytes stay in the
/// [`MediaStore`] that published it and disappear once it is released.
/// Cloning a handle does not extend its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle {
    id: HandleId,
    listing_id: ListingId,
    token: StalenessToken,
    len: usize,
    content_type: Option<String>,
    format: Option<ImageFormat>,
    resolved_at: DateTime<Utc>,
}

impl MediaHandle {
    /// Store key of the bytes behind this handle.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Listing the photo belongs to.
    pub fn listing_id(&self) -> ListingId {
        self.listing_id
    }

    /// Token the photo was resolved under.
    pub fn token(&self) -> StalenessToken {
        self.token
    }

    /// Size of the photo in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Content type declared by the media endpoint.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Image format sniffed from the bytes, independent of the declared type.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// When the handle was published.
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Locally addressable name for the handle, valid until release.
    pub fn locator(&self) -> String {
        format!("trove-media://{}", self.id)
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: DashMap<HandleId, Bytes>,
    next_id: AtomicU64,
    published: AtomicU64,
    released: AtomicU64,
}

/// Owner of the bytes behind every live [`MediaHandle`].
#[derive(Debug, Clone, Default)]
pub struct MediaStore {
    inner: Arc<StoreInner>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register photo bytes and return the handle that addresses them.
    pub fn publish(
        &self,
        listing_id: ListingId,
        token: StalenessToken,
        photo: FetchedPhoto,
    ) -> MediaHandle {
        let id = HandleId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let handle = MediaHandle {
            id,
            listing_id,
            token,
            len: photo.bytes.len(),
            content_type: photo.content_type,
            format: image::guess_format(&photo.bytes).ok(),
            resolved_at: Utc::now(),
        };
        self.inner.entries.insert(id, photo.bytes);
        self.inner.published.fetch_add(1, Ordering::Relaxed);
        handle
    }

    /// Bytes behind `handle`, or `None` once it has been released.
    pub fn bytes(&self, handle: &MediaHandle) -> Option<Bytes> {
        self.inner
            .entries
            .get(&handle.id)
            .map(|entry| entry.value().clone())
    }

    /// Whether `handle` has not been released yet.
    pub fn is_live(&self, handle: &MediaHandle) -> bool {
        self.inner.entries.contains_key(&handle.id)
    }

    /// Reclaim the bytes behind `handle`.
    ///
    /// Idempotent: returns `true` only for the call that actually released
    /// the bytes.
    pub fn release(&self, handle: &MediaHandle) -> bool {
        let removed = self.inner.entries.remove(&handle.id).is_some();
        if removed {
            self.inner.released.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Handles published and not yet released.
    pub fn live_count(&self) -> usize {
        self.inner.entries.len()
    }

    /// Total size of the bytes behind live handles.
    pub fn resident_bytes(&self) -> u64 {
        self.inner
            .entries
            .iter()
            .map(|entry| entry.value().len() as u64)
            .sum()
    }

    /// Handles ever published.
    pub fn published_count(&self) -> u64 {
        self.inner.published.load(Ordering::Relaxed)
    }

    /// Handles ever released.
    pub fn released_count(&self) -> u64 {
        self.inner.released.load(Ordering::Relaxed)
    }
}
