use sha2::{Digest, Sha256};

use crate::listing::Listing;

/// Opaque value whose change means "this listing's photo may have changed".
///
/// Two tokens are only ever compared for equality. Surfaces may derive them
/// from listing fields, from a revision counter, or from both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StalenessToken(u64);

impl StalenessToken {
    pub const fn initial() -> Self {
        StalenessToken(0)
    }

    pub const fn from_revision(revision: u64) -> Self {
        StalenessToken(revision)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Stable digest of the listing's mutable fields.
    pub fn for_listing(listing: &Listing) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(listing.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(listing.description.as_bytes());
        hasher.update([0u8]);
        hasher.update(listing.price.cents().to_be_bytes());
        StalenessToken(truncate(&hasher.finalize()))
    }

    /// Fold a revision counter into this token.
    pub fn with_revision(self, revision: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.0.to_be_bytes());
        hasher.update(revision.to_be_bytes());
        StalenessToken(truncate(&hasher.finalize()))
    }
}

impl std::fmt::Display for StalenessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

fn truncate(digest: &[u8]) -> u64 {
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}
