use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{FollowListEntry, FollowListId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishFollowListRequest {
    pub name: String,
    pub cover_image_url: String,
    pub entries: Vec<FollowListEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<FollowListId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishFollowListResponse {
    #[serde(default)]
    pub id: Option<FollowListId>,
}

/// `/.well-known/nostr.json` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nip05Document {
    #[serde(default)]
    pub names: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relays: Option<HashMap<String, Vec<String>>>,
}

impl Nip05Document {
    /// Exact label first, then a case-insensitive match.
    pub fn lookup(&self, label: &str) -> Option<&str> {
        if let Some(value) = self.names.get(label) {
            return Some(value.as_str());
        }
        self.names
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFollowListResponse {
    pub deleted: bool,
}
