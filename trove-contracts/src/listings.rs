use async_trait::async_trait;
use std::fmt::Debug;
use trove_model::{Listing, ListingFields, ListingId, OwnerEmail};

use crate::gateway::GatewayResult;

/// Read side of the listing endpoints. Surfaces use it to populate lists.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait ListingReader: Send + Sync + Debug {
    /// Every listing, in server order.
    async fn list_listings(&self) -> GatewayResult<Vec<Listing>>;

    /// Listings owned by `owner`, in server order.
    async fn list_listings_for_owner(
        &self,
        owner: &OwnerEmail,
    ) -> GatewayResult<Vec<Listing>>;
}

/// Write side of the listing endpoints.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait ListingWriter: Send + Sync + Debug {
    /// Persist a new listing and return it with its assigned id.
    async fn create_listing(
        &self,
        owner: &OwnerEmail,
        fields: &ListingFields,
    ) -> GatewayResult<Listing>;

    /// Overwrite the fields of an existing listing. There is no version
    /// check; the last write wins.
    async fn update_listing(
        &self,
        id: ListingId,
        owner: &OwnerEmail,
        fields: &ListingFields,
    ) -> GatewayResult<Listing>;

    /// Remove a listing. The server also drops its photo.
    async fn delete_listing(
        &self,
        id: ListingId,
        owner: &OwnerEmail,
    ) -> GatewayResult<()>;
}
