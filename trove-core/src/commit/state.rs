use std::fmt;

use trove_model::{Listing, ListingId, StalenessToken};
use uuid::Uuid;

use crate::error::{CommitError, MediaUploadError};

/// Identity of one submission, carried on every log line it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(Uuid);

impl CommitId {
    pub fn new() -> Self {
        CommitId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CommitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Phase a commit had reached when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStage {
    /// Local checks rejected the input.
    Validation,
    /// The listing write endpoint failed.
    Listing,
}

impl fmt::Display for CommitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitStage::Validation => f.write_str("validation"),
            CommitStage::Listing => f.write_str("listing"),
        }
    }
}

/// Progress of a create or update submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommitState {
    /// Form input not yet submitted.
    #[default]
    Draft,
    PersistingListing,
    ListingPersisted { listing: Listing },
    UploadingPhoto { listing_id: ListingId },
    /// Everything was written. `token` is the listing's new staleness token
    /// when a photo was attached.
    Committed {
        listing: Listing,
        token: Option<StalenessToken>,
    },
    /// The listing was persisted, the photo was not. Nothing is rolled back.
    PartialFailure {
        listing: Listing,
        photo_error: MediaUploadError,
    },
    Failed {
        stage: CommitStage,
        error: CommitError,
    },
}

impl CommitState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CommitState::Committed { .. }
                | CommitState::PartialFailure { .. }
                | CommitState::Failed { .. }
        )
    }

    /// Whether the listing record is known to be on the server.
    pub fn listing_persisted(&self) -> bool {
        matches!(
            self,
            CommitState::ListingPersisted { .. }
                | CommitState::UploadingPhoto { .. }
                | CommitState::Committed { .. }
                | CommitState::PartialFailure { .. }
        )
    }

    pub fn listing_id(&self) -> Option<ListingId> {
        match self {
            CommitState::ListingPersisted { listing }
            | CommitState::Committed { listing, .. }
            | CommitState::PartialFailure { listing, .. } => Some(listing.id),
            CommitState::UploadingPhoto { listing_id } => Some(*listing_id),
            _ => None,
        }
    }

    /// Short label for logs and terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            CommitState::Draft => "draft",
            CommitState::PersistingListing => "persisting-listing",
            CommitState::ListingPersisted { .. } => "listing-persisted",
            CommitState::UploadingPhoto { .. } => "uploading-photo",
            CommitState::Committed { .. } => "committed",
            CommitState::PartialFailure { .. } => "partial-failure",
            CommitState::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitState::ListingPersisted { listing } => {
                write!(f, "listing {} persisted", listing.id)
            }
            CommitState::UploadingPhoto { listing_id } => {
                write!(f, "uploading photo for listing {listing_id}")
            }
            CommitState::Committed { listing, .. } => {
                write!(f, "listing {} committed", listing.id)
            }
            CommitState::PartialFailure {
                listing,
                photo_error,
            } => write!(
                f,
                "listing {} saved but photo was not: {photo_error}",
                listing.id
            ),
            CommitState::Failed { stage, error } => {
                write!(f, "{stage} failed: {error}")
            }
            other => f.write_str(other.label()),
        }
    }
}
