//! Classification of the single "add people" input box.

use shared::{
    domain::PublicKeyHex,
    identity::{npub_to_hex, strip_uri_prefix},
};

use crate::{error::EditorError, nip05::Nip05Identifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityQuery {
    Empty,
    PublicKey(PublicKeyHex),
    Nip05(Nip05Identifier),
    Search(String),
}

impl IdentityQuery {
    pub fn classify(input: &str) -> Result<Self, EditorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(IdentityQuery::Empty);
        }

        let value = strip_uri_prefix(trimmed);
        if value.starts_with("npub1") {
            return Ok(IdentityQuery::PublicKey(npub_to_hex(value)?));
        }

        if let Ok(pubkey) = PublicKeyHex::parse(value) {
            return Ok(IdentityQuery::PublicKey(pubkey));
        }

        if value.contains('@') || looks_like_domain(value) {
            return Ok(IdentityQuery::Nip05(Nip05Identifier::parse(value)?));
        }

        Ok(IdentityQuery::Search(trimmed.to_string()))
    }
}

/// A single token whose last label is an alphabetic TLD, e.g. `example.com`.
fn looks_like_domain(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.rsplit_once('.') {
        Some((head, tld)) => {
            !head.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}
