//! Core data model definitions shared across Trove crates.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod listing;
pub mod photo;
pub mod prelude;
pub mod price;
pub mod staleness;

// Intentionally curated re-exports for downstream consumers.
pub use error::{FieldIssue, ListingField, ModelError, Result as ModelResult, ValidationError};
pub use ids::ListingId;
pub use listing::{FieldLimits, Listing, ListingDraft, ListingFields, OwnerEmail};
pub use photo::PhotoUpload;
pub use price::Price;
pub use staleness::StalenessToken;
