use shared::identity::IdentityError;
use thiserror::Error;

use crate::nip05::Nip05Error;

/// Failures surfaced by the follow pack editor. `Display` is the text shown to the user.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("You must be logged in to edit a follow pack")]
    NotLoggedInForEdit,
    #[error("You must be logged in to publish a follow pack")]
    NotLoggedInForPublish,
    #[error("You can only edit your own follow packs")]
    NotAuthor,
    #[error("Follow pack not found")]
    NotFound,
    #[error("Please enter a name for your follow pack")]
    MissingName,
    #[error("Add at least one person to your follow pack")]
    NoEntries,
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Nip05(#[from] Nip05Error),
    #[error("Failed to load follow pack: {0}")]
    Load(String),
    #[error("Search failed: {0}")]
    Search(String),
    #[error("Failed to publish follow pack")]
    PublishRejected,
    #[error("Failed to publish follow pack: {0}")]
    Publish(String),
    #[error("Failed to delete follow pack")]
    DeleteRejected,
    #[error("Failed to delete follow pack: {0}")]
    Delete(String),
}

impl EditorError {
    /// Validation and authorization failures, as opposed to service failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            EditorError::NotLoggedInForEdit
                | EditorError::NotLoggedInForPublish
                | EditorError::NotAuthor
                | EditorError::MissingName
                | EditorError::NoEntries
                | EditorError::Identity(_)
        ) || matches!(self, EditorError::Nip05(Nip05Error::InvalidIdentifier(_)))
    }
}
