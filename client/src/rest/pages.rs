use super::errors::describe_error_response;
use crate::common::validate;
use crate::paging::{Page, PageError, PageFetcher, PageResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// List envelope used by the REST listing convention.
///
/// The continuation token is the `nextLink` URL; its absence marks the
/// final page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListEnvelope<T> {
    pub value: Vec<T>,
    #[serde(rename = "nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl<T> From<ListEnvelope<T>> for Page<T> {
    fn from(envelope: ListEnvelope<T>) -> Self {
        Page::new(envelope.value, envelope.next_link)
    }
}

/// [`PageFetcher`] backed by REST listing endpoints.
///
/// The first page GETs the listing URL; follow-up pages GET the `nextLink`
/// the server handed back. One round trip per call, no retries.
#[derive(Debug)]
pub struct RestPageFetcher<T> {
    http: reqwest::Client,
    first_url: String,
    bearer_token: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> RestPageFetcher<T> {
    /// Creates a fetcher for one listing endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`validate::ValidationError`] when the listing URL is absent
    /// or not an absolute http(s) URL.
    pub fn new(
        http: reqwest::Client,
        first_url: &str,
        bearer_token: &str,
    ) -> Result<Self, validate::ValidationError> {
        let first_url = validate::require_http_url("listing URL", first_url)?;
        let bearer_token = validate::require_non_empty("bearer token", bearer_token)?;
        Ok(Self {
            http,
            first_url: first_url.to_string(),
            bearer_token: bearer_token.to_string(),
            _item: PhantomData,
        })
    }
}

#[async_trait]
impl<T> PageFetcher<T> for RestPageFetcher<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch_first(&self) -> PageResult<Page<T>> {
        log::debug!("fetching first page from {}", self.first_url);

        let response = self
            .http
            .get(&self.first_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer_token))
            .send()
            .await
            .map_err(|e| PageError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PageError::Fetch(describe_error_response(response).await));
        }

        let envelope: ListEnvelope<T> = response
            .json()
            .await
            .map_err(|e| PageError::Fetch(format!("page decode failed: {e}")))?;

        Ok(envelope.into())
    }

    async fn fetch_next(&self, continuation_token: &str) -> PageResult<Page<T>> {
        let next_link = validate::require_http_url("continuation token", continuation_token)
            .map_err(|e| PageError::InvalidContinuation(e.to_string()))?;

        log::debug!("fetching next page from {next_link}");

        let response = self
            .http
            .get(next_link)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer_token))
            .send()
            .await
            .map_err(|e| PageError::Fetch(e.to_string()))?;

        // A rejected continuation link (expired or tampered) comes back as a
        // client error rather than a transient failure.
        if response.status() == StatusCode::BAD_REQUEST {
            return Err(PageError::InvalidContinuation(
                describe_error_response(response).await,
            ));
        }
        if !response.status().is_success() {
            return Err(PageError::Fetch(describe_error_response(response).await));
        }

        let envelope: ListEnvelope<T> = response
            .json()
            .await
            .map_err(|e| PageError::Fetch(format!("page decode failed: {e}")))?;

        Ok(envelope.into())
    }
}
