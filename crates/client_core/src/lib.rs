use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{FollowList, FollowListId, ProfileMetadata, PublicKeyHex, SearchHit},
    protocol::PublishFollowListRequest,
};

pub mod config;
pub mod editor;
pub mod error;
pub mod nip05;
pub mod pack_service;
pub mod query;
pub mod session;

pub use editor::{
    edit_id_from_query, EditorMode, EditorOutcome, EditorServices, EditorState, FollowPackEditor,
    SearchOutcome,
};
pub use error::EditorError;
pub use nip05::{HttpNip05Resolver, Nip05Error, Nip05Identifier, Nip05Resolver};
pub use pack_service::PackServiceClient;
pub use session::StaticSession;

/// Full-text people search.
#[async_trait]
pub trait UserSearch: Send + Sync {
    async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

/// Profile metadata lookup by public key.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn get_profile_by_pubkey(&self, pubkey: &PublicKeyHex) -> Result<ProfileMetadata>;
}

/// Persistence of follow lists. Signing and relay publishing happen behind this seam.
#[async_trait]
pub trait FollowListService: Send + Sync {
    /// Returns the identifier of the published list, or `None` when the
    /// publisher refused it.
    async fn publish_follow_list(
        &self,
        request: &PublishFollowListRequest,
    ) -> Result<Option<FollowListId>>;

    async fn get_follow_list_by_id(&self, id: &FollowListId) -> Result<Option<FollowList>>;

    async fn delete_follow_list(&self, event_id: &FollowListId) -> Result<bool>;
}

/// Identity of the signed-in user, if any.
pub trait SessionStore: Send + Sync {
    fn current_user(&self) -> Option<PublicKeyHex>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
