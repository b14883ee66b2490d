//! Surface-focused snapshot of the model types.
//! Prefer importing from this module in presentation layers.

pub use super::error::{FieldIssue, ListingField, ModelError, ValidationError};
pub use super::ids::ListingId;
pub use super::listing::{FieldLimits, Listing, ListingDraft, ListingFields, OwnerEmail};
pub use super::photo::PhotoUpload;
pub use super::price::Price;
pub use super::staleness::StalenessToken;
