//! One-stop imports for surfaces built on the core.

pub use crate::api::HttpGateway;
pub use crate::commit::{
    CommitId, CommitPolicy, CommitStage, CommitState, CommitStream, DeleteOutcome,
    ListingCommitCoordinator,
};
pub use crate::error::{
    CommitError, CommitTarget, ListingPersistError, MediaErrorKind, MediaFetchError,
    MediaUploadError,
};
pub use crate::media::{
    MediaBinding, MediaCache, MediaHandle, MediaSnapshot, MediaStatus, MediaStore,
    StalenessRegistry,
};
pub use crate::services::ClientServices;
pub use trove_contracts::prelude::*;
pub use trove_model::prelude::*;
