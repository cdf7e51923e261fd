use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::IdentityError;

/// A 32-byte public key rendered as 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKeyHex(String);

impl PublicKeyHex {
    pub fn parse(value: &str) -> Result<Self, IdentityError> {
        let value = value.trim();
        if value.len() != 64 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdentityError::InvalidHex(value.to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First and last few characters, for compact display.
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..8], &self.0[56..])
    }
}

impl fmt::Display for PublicKeyHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PublicKeyHex {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PublicKeyHex> for String {
    fn from(value: PublicKeyHex) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FollowListId(pub String);

impl fmt::Display for FollowListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowListEntry {
    pub pubkey: PublicKeyHex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip05: Option<String>,
}

impl FollowListEntry {
    pub fn new(pubkey: PublicKeyHex) -> Self {
        Self {
            pubkey,
            name: None,
            picture: None,
            bio: None,
            nip05: None,
        }
    }

    pub fn with_profile(pubkey: PublicKeyHex, profile: ProfileMetadata) -> Self {
        Self {
            pubkey,
            name: profile.name,
            picture: profile.picture,
            bio: profile.bio,
            nip05: profile.nip05,
        }
    }

    /// Name if known, otherwise the shortened key.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.pubkey.short(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowList {
    pub id: FollowListId,
    pub author: PublicKeyHex,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub entries: Vec<FollowListEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub nip05: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub pubkey: PublicKeyHex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nip05: Option<String>,
}

impl SearchHit {
    pub fn into_entry(self) -> FollowListEntry {
        FollowListEntry {
            pubkey: self.pubkey,
            name: self.name,
            picture: self.picture,
            bio: None,
            nip05: self.nip05,
        }
    }
}

/// Page the client navigates to after an editor action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Pack(FollowListId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Pack(id) => format!("/d/{}", id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";

    #[test]
    fn public_key_hex_is_normalized_to_lowercase() {
        let key = PublicKeyHex::parse(&KEY.to_ascii_uppercase()).expect("parse");
        assert_eq!(key.as_str(), KEY);
    }

    #[test]
    fn public_key_hex_rejects_wrong_length_and_non_hex() {
        assert!(PublicKeyHex::parse(&KEY[..63]).is_err());
        assert!(PublicKeyHex::parse(&format!("{}zz", &KEY[..62])).is_err());
    }

    #[test]
    fn public_key_hex_deserialization_validates() {
        let ok: Result<PublicKeyHex, _> = serde_json::from_str(&format!("\"{KEY}\""));
        assert!(ok.is_ok());
        let bad: Result<PublicKeyHex, _> = serde_json::from_str("\"abc\"");
        assert!(bad.is_err());
    }

    #[test]
    fn entry_display_name_falls_back_to_short_key() {
        let mut entry = FollowListEntry::new(PublicKeyHex::parse(KEY).expect("parse"));
        assert_eq!(entry.display_name(), "7e7e9c42…86addf4e");
        entry.name = Some("  ".to_string());
        assert_eq!(entry.display_name(), "7e7e9c42…86addf4e");
        entry.name = Some("fiatjaf".to_string());
        assert_eq!(entry.display_name(), "fiatjaf");
    }

    #[test]
    fn routes_render_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(
            Route::Pack(FollowListId("abc123".to_string())).path(),
            "/d/abc123"
        );
    }
}
