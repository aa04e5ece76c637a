use super::errors::{describe_error_response, retry_after_hint};
use crate::common::validate;
use crate::operation::{
    ErrorDetail, Operation, OperationClient, OperationStatus, PollerError, PollerResult,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

const OPERATION_LOCATION: &str = "Operation-Location";

/// Status query response format
#[derive(Debug, Deserialize)]
struct StatusResponse<R> {
    status: OperationStatus,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
    result: Option<R>,
}

/// [`OperationClient`] backed by REST endpoints following the
/// `Operation-Location` convention.
///
/// Submission POSTs the given URL; the accepted response's
/// `Operation-Location` header becomes the operation token and every status
/// query GETs it. The success payload is decoded from the `result` field of
/// the status body.
///
/// The client issues exactly one round trip per call and never retries;
/// layer retry policy into the injected `reqwest::Client` if desired.
#[derive(Debug)]
pub struct RestOperationClient<R> {
    http: reqwest::Client,
    submit_url: String,
    bearer_token: String,
    submit_body: serde_json::Value,
    _result: PhantomData<fn() -> R>,
}

impl<R> RestOperationClient<R> {
    /// Creates a client for one operation submission endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`validate::ValidationError`] when the submit URL is absent
    /// or not an absolute http(s) URL.
    pub fn new(
        http: reqwest::Client,
        submit_url: &str,
        bearer_token: &str,
        submit_body: serde_json::Value,
    ) -> Result<Self, validate::ValidationError> {
        let submit_url = validate::require_http_url("submit URL", submit_url)?;
        let bearer_token = validate::require_non_empty("bearer token", bearer_token)?;
        Ok(Self {
            http,
            submit_url: submit_url.to_string(),
            bearer_token: bearer_token.to_string(),
            submit_body,
            _result: PhantomData,
        })
    }
}

#[async_trait]
impl<R> OperationClient<R> for RestOperationClient<R>
where
    R: DeserializeOwned + Send + Sync + 'static,
{
    async fn initiate(&self) -> PollerResult<Operation<R>> {
        log::debug!("submitting operation to {}", self.submit_url);

        let response = self
            .http
            .post(&self.submit_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer_token))
            .header(CONTENT_TYPE, "application/json")
            .json(&self.submit_body)
            .send()
            .await
            .map_err(|e| PollerError::Submission(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PollerError::Submission(
                describe_error_response(response).await,
            ));
        }

        let retry_after = retry_after_hint(response.headers());
        let location = response
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .ok_or_else(|| {
                PollerError::Submission(format!(
                    "accepted response carried no {OPERATION_LOCATION} header"
                ))
            })?;

        Ok(Operation::accepted(location, retry_after))
    }

    async fn fetch_status(&self, token: &str) -> PollerResult<Operation<R>> {
        let token = validate::require_http_url("operation token", token)
            .map_err(|e| PollerError::IllegalState(e.to_string()))?;

        let response = self
            .http
            .get(token)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer_token))
            .send()
            .await
            .map_err(|e| PollerError::PollQuery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PollerError::PollQuery(
                describe_error_response(response).await,
            ));
        }

        let retry_after = retry_after_hint(response.headers());
        let status_body: StatusResponse<R> = response
            .json()
            .await
            .map_err(|e| PollerError::PollQuery(format!("status decode failed: {e}")))?;

        Ok(Operation {
            token: token.to_string(),
            status: status_body.status,
            last_polled_at: Utc::now(),
            retry_after,
            result: status_body.result,
            errors: status_body.errors,
        })
    }
}
