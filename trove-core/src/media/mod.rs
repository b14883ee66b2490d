//! Media resource cache.
//!
//! A [`MediaCache`] hands out one [`MediaBinding`] per consuming surface.
//! Bindings resolve `(listing, token)` pairs into [`MediaHandle`]s held by the
//! shared [`MediaStore`], which owns the bytes behind every live handle until
//! the binding releases it.

mod binding;
mod cache;
mod staleness;
mod store;

pub use binding::{MediaBinding, MediaSnapshot, MediaStatus};
pub use cache::MediaCache;
pub use staleness::{StalenessRegistry, StalenessUpdate};
pub use store::{HandleId, MediaHandle, MediaStore};
