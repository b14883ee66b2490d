use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, warn};
use trove_config::CommitConfig;
use trove_contracts::confirm::{Confirm, ConfirmRequest};
use trove_contracts::listings::ListingWriter;
use trove_contracts::media::MediaUploader;
use trove_model::{
    FieldLimits, ListingDraft, ListingField, ListingFields, ListingId, OwnerEmail, PhotoUpload,
    StalenessToken, ValidationError,
};

use crate::error::{CommitError, CommitTarget, ListingPersistError, MediaUploadError};
use crate::media::StalenessRegistry;

use super::state::{CommitId, CommitStage, CommitState};
use super::stream::CommitStream;

/// Local rules checked before a submission touches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitPolicy {
    /// Field bounds applied to every draft.
    pub limits: FieldLimits,
    /// Reject creates that carry no photo.
    pub require_photo_on_create: bool,
}

impl From<&CommitConfig> for CommitPolicy {
    fn from(config: &CommitConfig) -> Self {
        Self {
            limits: config.field_limits(),
            require_photo_on_create: config.require_photo_on_create,
        }
    }
}

/// Result of a confirmed or declined delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user said no; nothing was sent.
    Declined,
    /// The listing is gone.
    Deleted {
        /// Bumped token, so bound surfaces notice the missing photo.
        token: StalenessToken,
    },
}

/// Runs listing writes and keeps the staleness registry in step with them.
#[derive(Debug, Clone)]
pub struct ListingCommitCoordinator {
    writer: Arc<dyn ListingWriter>,
    uploader: Arc<dyn MediaUploader>,
    tokens: StalenessRegistry,
    policy: CommitPolicy,
}

impl ListingCommitCoordinator {
    pub fn new(
        writer: Arc<dyn ListingWriter>,
        uploader: Arc<dyn MediaUploader>,
        tokens: StalenessRegistry,
    ) -> Self {
        Self {
            writer,
            uploader,
            tokens,
            policy: CommitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &CommitPolicy {
        &self.policy
    }

    pub fn tokens(&self) -> &StalenessRegistry {
        &self.tokens
    }

    /// Create a listing owned by `owner`, then attach `photo` if given.
    pub fn submit_create(
        &self,
        owner: &OwnerEmail,
        draft: &ListingDraft,
        photo: Option<PhotoUpload>,
    ) -> CommitStream {
        self.submit(owner, CommitTarget::Create, draft, photo)
    }

    /// Overwrite an existing listing's fields, then replace its photo if a
    /// new one is given. No version check is made; the last write wins.
    pub fn submit_update(
        &self,
        owner: &OwnerEmail,
        listing_id: ListingId,
        draft: &ListingDraft,
        photo: Option<PhotoUpload>,
    ) -> CommitStream {
        self.submit(owner, CommitTarget::Update(listing_id), draft, photo)
    }

    /// Delete a listing after the surface's confirmation.
    ///
    /// Single phase: the server owns any cleanup of the listing's photo.
    pub async fn delete(
        &self,
        owner: &OwnerEmail,
        listing_id: ListingId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, CommitError> {
        let request = ConfirmRequest::DeleteListing { id: listing_id };
        if !confirm.confirm(&request) {
            debug!(listing_id = %listing_id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        self.writer
            .delete_listing(listing_id, owner)
            .await
            .map_err(|source| {
                warn!(listing_id = %listing_id, error = %source, "delete failed");
                CommitError::Delete {
                    id: listing_id,
                    source,
                }
            })?;

        let token = self.tokens.bump(listing_id);
        info!(listing_id = %listing_id, "listing deleted");
        Ok(DeleteOutcome::Deleted { token })
    }

    fn validate(
        &self,
        target: CommitTarget,
        draft: &ListingDraft,
        photo: Option<&PhotoUpload>,
    ) -> Result<ListingFields, ValidationError> {
        let fields = draft.validate(&self.policy.limits);
        let mut errors = fields.as_ref().err().cloned().unwrap_or_default();

        match photo {
            Some(photo) => {
                if let Err(photo_errors) = photo.validate() {
                    errors.merge(photo_errors);
                }
            }
            None if target == CommitTarget::Create && self.policy.require_photo_on_create => {
                errors.push(ListingField::Photo, "a photo is required to create a listing");
            }
            None => {}
        }

        errors.into_result()?;
        fields
    }

    fn submit(
        &self,
        owner: &OwnerEmail,
        target: CommitTarget,
        draft: &ListingDraft,
        photo: Option<PhotoUpload>,
    ) -> CommitStream {
        let commit_id = CommitId::new();

        let fields = match self.validate(target, draft, photo.as_ref()) {
            Ok(fields) => fields,
            Err(error) => {
                info!(
                    commit_id = %commit_id,
                    op = %target,
                    issues = error.issues().len(),
                    "commit rejected: {error}"
                );
                return CommitStream::rejected(
                    commit_id,
                    CommitState::Failed {
                        stage: CommitStage::Validation,
                        error: error.into(),
                    },
                );
            }
        };

        let writer = Arc::clone(&self.writer);
        let uploader = Arc::clone(&self.uploader);
        let tokens = self.tokens.clone();
        let owner = owner.clone();

        let states = async_stream::stream! {
            debug!(commit_id = %commit_id, op = %target, "persisting listing");
            yield CommitState::PersistingListing;

            let persisted = match target {
                CommitTarget::Create => writer.create_listing(&owner, &fields).await,
                CommitTarget::Update(listing_id) => {
                    writer.update_listing(listing_id, &owner, &fields).await
                }
            };
            let listing = match persisted {
                Ok(listing) => listing,
                Err(source) => {
                    warn!(commit_id = %commit_id, op = %target, error = %source, "listing write failed");
                    yield CommitState::Failed {
                        stage: CommitStage::Listing,
                        error: ListingPersistError { target, source }.into(),
                    };
                    return;
                }
            };

            info!(commit_id = %commit_id, listing_id = %listing.id, "listing persisted");
            yield CommitState::ListingPersisted { listing: listing.clone() };

            let photo = match photo {
                Some(photo) => photo,
                None => {
                    yield CommitState::Committed { listing, token: None };
                    return;
                }
            };

            debug!(
                commit_id = %commit_id,
                listing_id = %listing.id,
                bytes = photo.len(),
                "uploading photo"
            );
            yield CommitState::UploadingPhoto { listing_id: listing.id };

            match uploader.upload_photo(listing.id, &photo).await {
                Ok(()) => {
                    let token = tokens.bump(listing.id);
                    info!(commit_id = %commit_id, listing_id = %listing.id, "photo attached");
                    yield CommitState::Committed { listing, token: Some(token) };
                }
                Err(source) => {
                    warn!(
                        commit_id = %commit_id,
                        listing_id = %listing.id,
                        error = %source,
                        "photo upload failed; listing kept"
                    );
                    let photo_error = MediaUploadError {
                        listing_id: listing.id,
                        source,
                    };
                    yield CommitState::PartialFailure { listing, photo_error };
                }
            }
        };

        CommitStream::running(commit_id, states.boxed())
    }
}
