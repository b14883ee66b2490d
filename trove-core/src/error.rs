use thiserror::Error;
use trove_contracts::gateway::GatewayError;
use trove_model::{ListingId, ValidationError};

/// Coarse classification of a photo read failure, suitable for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaErrorKind {
    /// The listing has no photo.
    NotFound,
    /// The endpoint answered with another non-success status.
    Status(u16),
    /// The request never produced a usable response.
    Transport,
}

/// Photo read failure. Surfaces treat it as "no photo available"; it never
/// makes the surrounding listing unusable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaFetchError {
    #[error("listing {id} has no photo")]
    NotFound { id: ListingId },

    #[error("photo request for listing {id} failed with status {status}: {message}")]
    Status {
        id: ListingId,
        status: u16,
        message: String,
    },

    #[error("photo request for listing {id} failed: {message}")]
    Transport { id: ListingId, message: String },
}

impl MediaFetchError {
    pub fn from_gateway(id: ListingId, err: GatewayError) -> Self {
        match err {
            GatewayError::Status { status: 404, .. } => MediaFetchError::NotFound { id },
            GatewayError::Status { status, message } => MediaFetchError::Status {
                id,
                status,
                message,
            },
            GatewayError::Transport(message) | GatewayError::Decode(message) => {
                MediaFetchError::Transport { id, message }
            }
        }
    }

    pub fn kind(&self) -> MediaErrorKind {
        match self {
            MediaFetchError::NotFound { .. } => MediaErrorKind::NotFound,
            MediaFetchError::Status { status, .. } => MediaErrorKind::Status(*status),
            MediaFetchError::Transport { .. } => MediaErrorKind::Transport,
        }
    }
}

/// Which listing write was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTarget {
    Create,
    Update(ListingId),
}

impl std::fmt::Display for CommitTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitTarget::Create => f.write_str("create"),
            CommitTarget::Update(id) => write!(f, "update of listing {id}"),
        }
    }
}

/// The listing write endpoint refused or never answered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("listing {target} failed: {source}")]
pub struct ListingPersistError {
    pub target: CommitTarget,
    #[source]
    pub source: GatewayError,
}

impl ListingPersistError {
    /// Human-readable message from the server, when it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match &self.source {
            GatewayError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Photo upload failed after the listing itself was persisted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("photo upload for listing {listing_id} failed: {source}")]
pub struct MediaUploadError {
    pub listing_id: ListingId,
    #[source]
    pub source: GatewayError,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("invalid listing: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persist(#[from] ListingPersistError),

    #[error("deleting listing {id} failed: {source}")]
    Delete {
        id: ListingId,
        #[source]
        source: GatewayError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_404_maps_to_missing_photo() {
        let id = ListingId::new(4);
        let err = MediaFetchError::from_gateway(id, GatewayError::status(404, "Media not found"));
        assert_eq!(err, MediaFetchError::NotFound { id });
        assert_eq!(err.kind(), MediaErrorKind::NotFound);
    }

    #[test]
    fn decode_failures_count_as_transport() {
        let err = MediaFetchError::from_gateway(
            ListingId::new(1),
            GatewayError::Decode("truncated".into()),
        );
        assert_eq!(err.kind(), MediaErrorKind::Transport);
    }

    #[test]
    fn persist_error_exposes_server_message() {
        let err = ListingPersistError {
            target: CommitTarget::Update(ListingId::new(9)),
            source: GatewayError::status(403, "You can only edit your own listing."),
        };
        assert_eq!(err.server_message(), Some("You can only edit your own listing."));
        assert!(err.to_string().contains("update of listing 9"));
    }
}
