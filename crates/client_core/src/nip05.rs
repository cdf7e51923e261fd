//! NIP-05 identifier parsing and `/.well-known/nostr.json` resolution.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{redirect, Client};
use shared::{domain::PublicKeyHex, protocol::Nip05Document};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

const ROOT_LOCAL_PART: &str = "_";
const WELL_KNOWN_PATH: &str = "/.well-known/nostr.json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Nip05Error {
    #[error("Invalid NIP-05 identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Could not reach {domain}: {reason}")]
    Request { domain: String, reason: String },
    #[error("{domain} returned HTTP {status} for nostr.json")]
    Status { domain: String, status: u16 },
    #[error("Malformed nostr.json from {domain}: {reason}")]
    MalformedDocument { domain: String, reason: String },
    #[error("{identifier} is not listed in {domain}'s nostr.json")]
    NameNotFound { identifier: String, domain: String },
    #[error("{identifier} maps to an invalid public key")]
    InvalidPubkey { identifier: String },
}

/// `local@domain`, lowercased. A bare domain means `_@domain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nip05Identifier {
    local: String,
    domain: String,
}

impl Nip05Identifier {
    pub fn parse(input: &str) -> Result<Self, Nip05Error> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);
        let invalid = || Nip05Error::InvalidIdentifier(input.trim().to_string());

        let (local, domain) = match trimmed.split_once('@') {
            Some((local, domain)) => (local, domain),
            None => (ROOT_LOCAL_PART, trimmed),
        };

        if local.is_empty()
            || !local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid());
        }

        if domain.is_empty()
            || domain.starts_with('.')
            || domain.ends_with('.')
            || (!domain.contains('.') && !domain.contains(':'))
            || domain
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '/' | '@' | '?' | '#'))
        {
            return Err(invalid());
        }

        Ok(Self {
            local: local.to_ascii_lowercase(),
            domain: domain.to_ascii_lowercase(),
        })
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn well_known_url(&self, scheme: &str) -> Result<Url, Nip05Error> {
        let mut url = Url::parse(&format!("{scheme}://{}{WELL_KNOWN_PATH}", self.domain))
            .map_err(|err| Nip05Error::InvalidIdentifier(format!("{self}: {err}")))?;
        url.query_pairs_mut().append_pair("name", &self.local);
        Ok(url)
    }
}

impl fmt::Display for Nip05Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.local == ROOT_LOCAL_PART {
            f.write_str(&self.domain)
        } else {
            write!(f, "{}@{}", self.local, self.domain)
        }
    }
}

#[async_trait]
pub trait Nip05Resolver: Send + Sync {
    async fn resolve(&self, identifier: &Nip05Identifier) -> Result<PublicKeyHex, Nip05Error>;
}

pub struct HttpNip05Resolver {
    http: Client,
    scheme: String,
}

impl HttpNip05Resolver {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        // Well-known documents must be served directly; redirects are not followed.
        let http = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            http,
            scheme: "https".to_string(),
        })
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }
}

#[async_trait]
impl Nip05Resolver for HttpNip05Resolver {
    async fn resolve(&self, identifier: &Nip05Identifier) -> Result<PublicKeyHex, Nip05Error> {
        let url = identifier.well_known_url(&self.scheme)?;
        let domain = identifier.domain().to_string();
        info!(identifier = %identifier, "resolving nip-05 identifier");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| Nip05Error::Request {
                domain: domain.clone(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Nip05Error::Status {
                domain,
                status: status.as_u16(),
            });
        }

        let document: Nip05Document =
            response
                .json()
                .await
                .map_err(|err| Nip05Error::MalformedDocument {
                    domain: domain.clone(),
                    reason: err.to_string(),
                })?;

        let raw = document
            .lookup(identifier.local())
            .ok_or_else(|| Nip05Error::NameNotFound {
                identifier: identifier.to_string(),
                domain: domain.clone(),
            })?;

        let pubkey = PublicKeyHex::parse(raw).map_err(|_| Nip05Error::InvalidPubkey {
            identifier: identifier.to_string(),
        })?;
        debug!(identifier = %identifier, pubkey = %pubkey, "nip-05 identifier resolved");
        Ok(pubkey)
    }
}

#[cfg(test)]
#[path = "tests/nip05_tests.rs"]
mod tests;
