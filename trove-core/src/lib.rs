//! Media resource cache and listing commit coordinator for the Trove
//! marketplace client.
//!
//! Two pieces live here. [`media`] resolves a listing's single photo into a
//! renderable [`media::MediaHandle`], one binding per consuming surface, with
//! generation-checked publishing so late responses can never overwrite newer
//! ones and every superseded handle is reclaimed. [`commit`] runs the
//! two-phase "persist listing, then attach photo" write and reports partial
//! failure as a state instead of rolling anything back. The two meet in the
//! [`media::StalenessRegistry`]: a successful photo write bumps the listing's
//! token and every binding following it re-resolves.

#![allow(missing_docs)]

pub mod api;
pub mod commit;
pub mod error;
pub mod media;
pub mod prelude;
pub mod services;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{
    CommitError, CommitTarget, ListingPersistError, MediaErrorKind, MediaFetchError,
    MediaUploadError,
};
