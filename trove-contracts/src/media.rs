use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use trove_model::{ListingId, PhotoUpload};

use crate::gateway::GatewayResult;

/// Raw photo bytes as served by the media read endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPhoto {
    /// Photo content as served.
    pub bytes: Bytes,
    /// `Content-Type` header, when the server sent one.
    pub content_type: Option<String>,
}

impl FetchedPhoto {
    /// Photo without a declared content type.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Attach the declared content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Media read endpoint: resolves the single photo attached to a listing.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait MediaSource: Send + Sync + Debug {
    /// A listing without a photo reports a 404 status error.
    async fn fetch_photo(&self, id: ListingId) -> GatewayResult<FetchedPhoto>;
}

/// Media write endpoint: creates or overwrites a listing's photo.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait MediaUploader: Send + Sync + Debug {
    /// Create or overwrite the photo of listing `id`.
    async fn upload_photo(
        &self,
        id: ListingId,
        photo: &PhotoUpload,
    ) -> GatewayResult<()>;
}
