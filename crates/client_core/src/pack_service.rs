//! HTTP client for the follow-pack gateway that signs and publishes lists.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{FollowList, FollowListId, ProfileMetadata, PublicKeyHex, SearchHit},
    error::ApiError,
    protocol::{
        DeleteFollowListResponse, PublishFollowListRequest, PublishFollowListResponse, SearchQuery,
    },
};
use tracing::{debug, info};
use url::Url;

use crate::{FollowListService, ProfileDirectory, UserSearch};

pub struct PackServiceClient {
    http: Client,
    base_url: Url,
}

impl PackServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid service url '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("service url '{base_url}' cannot be used as a base"));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Turns a non-2xx response into an error, preferring the gateway's `ApiError` message.
async fn ensure_success(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => Err(anyhow!(
            "{} (HTTP {})",
            api_error.message,
            status.as_u16()
        )),
        Err(_) => Err(anyhow!("{action} returned HTTP {}", status.as_u16())),
    }
}

#[async_trait]
impl UserSearch for PackServiceClient {
    async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        debug!(query, limit, "gateway: search_users");
        let response = self
            .http
            .get(self.endpoint(&["search"]))
            .query(&SearchQuery {
                q: query.to_string(),
                limit,
            })
            .send()
            .await
            .context("failed to reach search endpoint")?;
        let response = ensure_success(response, "search").await?;
        response
            .json()
            .await
            .context("invalid search response payload")
    }
}

#[async_trait]
impl ProfileDirectory for PackServiceClient {
    async fn get_profile_by_pubkey(&self, pubkey: &PublicKeyHex) -> Result<ProfileMetadata> {
        let response = self
            .http
            .get(self.endpoint(&["profiles", pubkey.as_str()]))
            .send()
            .await
            .context("failed to reach profile endpoint")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(ProfileMetadata::default());
        }
        let response = ensure_success(response, "profile lookup").await?;
        response
            .json()
            .await
            .context("invalid profile response payload")
    }
}

#[async_trait]
impl FollowListService for PackServiceClient {
    async fn publish_follow_list(
        &self,
        request: &PublishFollowListRequest,
    ) -> Result<Option<FollowListId>> {
        info!(
            name = %request.name,
            entries = request.entries.len(),
            existing_id = ?request.existing_id,
            "gateway: publish_follow_list"
        );
        let response = self
            .http
            .post(self.endpoint(&["follow-lists"]))
            .json(request)
            .send()
            .await
            .context("failed to reach publish endpoint")?;
        let response = ensure_success(response, "publish").await?;
        let body: PublishFollowListResponse = response
            .json()
            .await
            .context("invalid publish response payload")?;
        Ok(body.id.filter(|id| !id.0.trim().is_empty()))
    }

    async fn get_follow_list_by_id(&self, id: &FollowListId) -> Result<Option<FollowList>> {
        let response = self
            .http
            .get(self.endpoint(&["follow-lists", &id.0]))
            .send()
            .await
            .context("failed to reach follow list endpoint")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response, "follow list lookup").await?;
        let list = response
            .json()
            .await
            .context("invalid follow list response payload")?;
        Ok(Some(list))
    }

    async fn delete_follow_list(&self, event_id: &FollowListId) -> Result<bool> {
        info!(event_id = %event_id, "gateway: delete_follow_list");
        let response = self
            .http
            .delete(self.endpoint(&["follow-lists", &event_id.0]))
            .send()
            .await
            .context("failed to reach delete endpoint")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let response = ensure_success(response, "delete").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(true);
        }
        let body: DeleteFollowListResponse = response
            .json()
            .await
            .context("invalid delete response payload")?;
        Ok(body.deleted)
    }
}

#[cfg(test)]
#[path = "tests/pack_service_tests.rs"]
mod tests;
