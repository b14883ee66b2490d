use trove_model::ListingId;

/// What the core is about to do and wants the user to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmRequest {
    /// Permanently remove a listing and its photo.
    DeleteListing {
        /// Listing about to be deleted.
        id: ListingId,
    },
}

impl ConfirmRequest {
    /// Question to put to the user.
    pub fn prompt(&self) -> String {
        match self {
            ConfirmRequest::DeleteListing { id } => {
                format!("Delete listing {id}? This cannot be undone.")
            }
        }
    }
}

/// User-confirmation capability supplied by the calling surface.
///
/// The core asks and acts on the answer; it never shows a dialog itself.
pub trait Confirm: Send + Sync {
    /// `true` when the user approved `request`.
    fn confirm(&self, request: &ConfirmRequest) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&ConfirmRequest) -> bool + Send + Sync,
{
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}
