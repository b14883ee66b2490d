//! Trait surfaces for the collaborators the Trove core depends on.
//!
//! The core never talks to the network directly: listing persistence, photo
//! transfer and user confirmation all arrive through these traits so that the
//! cache and the commit coordinator can be driven by an HTTP gateway, a fake,
//! or a mock.

/// User confirmation requested by the core.
pub mod confirm;
/// Error type shared by every remote collaborator.
pub mod gateway;
/// Listing read and write endpoints.
pub mod listings;
/// Photo read and write endpoints.
pub mod media;

/// Frequently used contracts for surfaces and orchestration code.
pub mod prelude {
    pub use super::confirm::{Confirm, ConfirmRequest};
    pub use super::gateway::{GatewayError, GatewayResult};
    pub use super::listings::{ListingReader, ListingWriter};
    pub use super::media::{FetchedPhoto, MediaSource, MediaUploader};
}
