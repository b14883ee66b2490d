//! In-memory marketplace used by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::{Notify, oneshot};
use trove_contracts::gateway::{GatewayError, GatewayResult};
use trove_contracts::listings::{ListingReader, ListingWriter};
use trove_contracts::media::{FetchedPhoto, MediaSource, MediaUploader};
use trove_model::{Listing, ListingFields, ListingId, OwnerEmail, PhotoUpload};

#[derive(Debug, Default)]
struct Failures {
    fetch: Option<GatewayError>,
    create: Option<GatewayError>,
    update: Option<GatewayError>,
    upload: Option<GatewayError>,
    delete: Option<GatewayError>,
}

#[derive(Debug, Default)]
struct MarketState {
    listings: Mutex<BTreeMap<ListingId, Listing>>,
    photos: Mutex<HashMap<ListingId, Bytes>>,
    next_id: AtomicU64,
    failures: Mutex<Failures>,
    gated: AtomicBool,
    gates: Mutex<Vec<(ListingId, oneshot::Sender<()>)>>,
    gates_changed: Notify,
    fetch_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

/// Fake implementing every remote contract against shared in-memory state.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeMarket {
    state: Arc<MarketState>,
}

impl FakeMarket {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hold every photo fetch until [`release_fetch`](Self::release_fetch).
    pub(crate) fn with_gated_fetches(self) -> Self {
        self.gate_fetches();
        self
    }

    pub(crate) fn gate_fetches(&self) {
        self.state.gated.store(true, Ordering::SeqCst);
    }

    pub(crate) fn ungate_fetches(&self) {
        self.state.gated.store(false, Ordering::SeqCst);
    }

    /// Next id handed out by `create_listing` will be `id`.
    pub(crate) fn with_next_id(self, id: u64) -> Self {
        self.state.next_id.store(id.saturating_sub(1), Ordering::SeqCst);
        self
    }

    pub(crate) fn put_photo(&self, id: ListingId, bytes: &[u8]) {
        self.state
            .photos
            .lock()
            .insert(id, Bytes::copy_from_slice(bytes));
    }

    pub(crate) fn photo(&self, id: ListingId) -> Option<Bytes> {
        self.state.photos.lock().get(&id).cloned()
    }

    pub(crate) fn insert_listing(&self, listing: Listing) {
        self.state.listings.lock().insert(listing.id, listing);
    }

    pub(crate) fn listing(&self, id: ListingId) -> Option<Listing> {
        self.state.listings.lock().get(&id).cloned()
    }

    pub(crate) fn fail_fetches(&self, err: GatewayError) {
        self.state.failures.lock().fetch = Some(err);
    }

    pub(crate) fn fail_creates(&self, err: GatewayError) {
        self.state.failures.lock().create = Some(err);
    }

    pub(crate) fn fail_updates(&self, err: GatewayError) {
        self.state.failures.lock().update = Some(err);
    }

    pub(crate) fn fail_uploads(&self, err: GatewayError) {
        self.state.failures.lock().upload = Some(err);
    }

    pub(crate) fn fail_deletes(&self, err: GatewayError) {
        self.state.failures.lock().delete = Some(err);
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.state.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.state.create_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn update_calls(&self) -> usize {
        self.state.update_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn upload_calls(&self) -> usize {
        self.state.upload_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.state.delete_calls.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` gated fetches are parked.
    pub(crate) async fn wait_for_pending(&self, count: usize) {
        loop {
            let notified = self.state.gates_changed.notified();
            if self.state.gates.lock().len() >= count {
                return;
            }
            notified.await;
        }
    }

    /// Let the oldest parked fetch for `id` proceed.
    pub(crate) fn release_fetch(&self, id: ListingId) {
        let gate = {
            let mut gates = self.state.gates.lock();
            let index = gates
                .iter()
                .position(|(pending, _)| *pending == id)
                .unwrap_or_else(|| panic!("no parked fetch for listing {id}"));
            gates.remove(index).1
        };
        let _ = gate.send(());
    }

    fn failure(&self, pick: impl FnOnce(&Failures) -> &Option<GatewayError>) -> GatewayResult<()> {
        match pick(&self.state.failures.lock()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn owned_listing(&self, id: ListingId, owner: &OwnerEmail) -> GatewayResult<Listing> {
        let listings = self.state.listings.lock();
        let listing = listings
            .get(&id)
            .ok_or_else(|| GatewayError::status(404, "Listing not found"))?;
        if &listing.owner_email != owner {
            return Err(GatewayError::status(
                403,
                "You can only edit your own listing.",
            ));
        }
        Ok(listing.clone())
    }
}

#[async_trait]
impl ListingReader for FakeMarket {
    async fn list_listings(&self) -> GatewayResult<Vec<Listing>> {
        Ok(self.state.listings.lock().values().cloned().collect())
    }

    async fn list_listings_for_owner(&self, owner: &OwnerEmail) -> GatewayResult<Vec<Listing>> {
        Ok(self
            .state
            .listings
            .lock()
            .values()
            .filter(|listing| &listing.owner_email == owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ListingWriter for FakeMarket {
    async fn create_listing(
        &self,
        owner: &OwnerEmail,
        fields: &ListingFields,
    ) -> GatewayResult<Listing> {
        self.state.create_calls.fetch_add(1, Ordering::SeqCst);
        self.failure(|f| &f.create)?;
        let id = ListingId::new(self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let listing = Listing {
            id,
            title: fields.title().to_owned(),
            price: fields.price(),
            description: fields.description().to_owned(),
            owner_email: owner.clone(),
        };
        self.insert_listing(listing.clone());
        Ok(listing)
    }

    async fn update_listing(
        &self,
        id: ListingId,
        owner: &OwnerEmail,
        fields: &ListingFields,
    ) -> GatewayResult<Listing> {
        self.state.update_calls.fetch_add(1, Ordering::SeqCst);
        self.failure(|f| &f.update)?;
        let mut listing = self.owned_listing(id, owner)?;
        listing.title = fields.title().to_owned();
        listing.price = fields.price();
        listing.description = fields.description().to_owned();
        self.insert_listing(listing.clone());
        Ok(listing)
    }

    async fn delete_listing(&self, id: ListingId, owner: &OwnerEmail) -> GatewayResult<()> {
        self.state.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.failure(|f| &f.delete)?;
        self.owned_listing(id, owner)?;
        self.state.listings.lock().remove(&id);
        self.state.photos.lock().remove(&id);
        Ok(())
    }
}

#[async_trait]
impl MediaSource for FakeMarket {
    async fn fetch_photo(&self, id: ListingId) -> GatewayResult<FetchedPhoto> {
        self.state.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.gated.load(Ordering::SeqCst) {
            let (tx, rx) = oneshot::channel();
            self.state.gates.lock().push((id, tx));
            self.state.gates_changed.notify_waiters();
            let _ = rx.await;
        }
        self.failure(|f| &f.fetch)?;
        self.photo(id)
            .map(|bytes| FetchedPhoto::new(bytes).with_content_type("image/png"))
            .ok_or_else(|| GatewayError::status(404, "Media not found"))
    }
}

#[async_trait]
impl MediaUploader for FakeMarket {
    async fn upload_photo(&self, id: ListingId, photo: &PhotoUpload) -> GatewayResult<()> {
        self.state.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.failure(|f| &f.upload)?;
        self.state.photos.lock().insert(id, photo.bytes.clone());
        Ok(())
    }
}

/// Owner used across the commit tests.
pub(crate) fn seller() -> OwnerEmail {
    OwnerEmail::parse("seller@example.com").unwrap()
}

/// Smallest byte string `image::guess_format` recognises as PNG.
pub(crate) const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
