//! Two-phase listing commit.
//!
//! A create or update first persists the listing record, then attaches the
//! photo. The phases are strictly sequential; a failed second phase leaves the
//! listing in place and is reported as [`CommitState::PartialFailure`].

mod coordinator;
mod state;
mod stream;

pub use coordinator::{CommitPolicy, DeleteOutcome, ListingCommitCoordinator};
pub use state::{CommitId, CommitStage, CommitState};
pub use stream::CommitStream;
