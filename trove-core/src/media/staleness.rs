use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use trove_model::{Listing, ListingId, StalenessToken};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// A listing's token moved forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessUpdate {
    pub listing_id: ListingId,
    pub token: StalenessToken,
}

#[derive(Debug)]
struct RegistryInner {
    revisions: DashMap<ListingId, u64>,
    updates: broadcast::Sender<StalenessUpdate>,
}

/// Per-listing revision counters shared by the cache and the coordinator.
///
/// Only successful photo writes and deletes bump a listing; everything else
/// reads.
#[derive(Debug, Clone)]
pub struct StalenessRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for StalenessRegistry {
    fn default() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RegistryInner {
                revisions: DashMap::new(),
                updates,
            }),
        }
    }
}

impl StalenessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self, id: ListingId) -> u64 {
        self.inner
            .revisions
            .get(&id)
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    /// Current token for `id`. Listings never bumped share the initial token.
    pub fn token(&self, id: ListingId) -> StalenessToken {
        StalenessToken::from_revision(self.revision(id))
    }

    /// Token combining the listing's field digest with its revision, for
    /// surfaces that hold a full listing record.
    pub fn token_for_listing(&self, listing: &Listing) -> StalenessToken {
        StalenessToken::for_listing(listing).with_revision(self.revision(listing.id))
    }

    /// Advance the listing's revision and announce the new token.
    pub fn bump(&self, id: ListingId) -> StalenessToken {
        let revision = {
            let mut entry = self.inner.revisions.entry(id).or_insert(0);
            *entry += 1;
            *entry
        };
        let token = StalenessToken::from_revision(revision);
        debug!(listing_id = %id, revision, "staleness token bumped");
        // Nobody listening is fine.
        let _ = self.inner.updates.send(StalenessUpdate {
            listing_id: id,
            token,
        });
        token
    }

    /// Stream of bumps, for surfaces that re-resolve on change.
    pub fn subscribe(&self) -> broadcast::Receiver<StalenessUpdate> {
        self.inner.updates.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trove_model::{OwnerEmail, Price};

    #[test]
    fn bump_changes_only_the_bumped_listing() {
        let registry = StalenessRegistry::new();
        let a = ListingId::new(1);
        let b = ListingId::new(2);
        let before_a = registry.token(a);
        let before_b = registry.token(b);

        let bumped = registry.bump(a);

        assert_ne!(bumped, before_a);
        assert_eq!(registry.token(a), bumped);
        assert_eq!(registry.token(b), before_b);
        assert_eq!(registry.revision(a), 1);
    }

    #[test]
    fn listing_token_tracks_fields_and_bumps() {
        let registry = StalenessRegistry::new();
        let mut listing = Listing {
            id: ListingId::new(3),
            title: "Lamp".into(),
            price: Price::from_cents(4250),
            description: "Works great".into(),
            owner_email: OwnerEmail::parse("seller@example.com").unwrap(),
        };
        let first = registry.token_for_listing(&listing);
        assert_eq!(registry.token_for_listing(&listing), first);

        registry.bump(listing.id);
        let bumped = registry.token_for_listing(&listing);
        assert_ne!(bumped, first);

        listing.price = Price::from_cents(4000);
        assert_ne!(registry.token_for_listing(&listing), bumped);
    }

    #[tokio::test]
    async fn subscribers_see_bumps() {
        let registry = StalenessRegistry::new();
        let mut updates = registry.subscribe();
        let token = registry.bump(ListingId::new(5));
        let update = updates.recv().await.unwrap();
        assert_eq!(update.listing_id, ListingId::new(5));
        assert_eq!(update.token, token);
    }
}
