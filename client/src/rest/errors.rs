//! Error-body decoding shared by the REST bindings.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

/// Service error response format
#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetails,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorDetails {
    code: String,
    message: String,
}

/// Renders a non-success response into a diagnostic string.
///
/// Tries the structured `{"error": {"code", "message"}}` body first and
/// falls back to the raw body text. The request id header is appended when
/// the service sent one.
pub(crate) async fn describe_error_response(response: reqwest::Response) -> String {
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-ms-request-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    let mut described = match response.text().await {
        Ok(body) => {
            if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "{} (HTTP {status}) - {}",
                    parsed.error.code, parsed.error.message
                )
            } else if body.is_empty() {
                format!("HTTP {status} error")
            } else {
                format!("HTTP {status} - {body}")
            }
        }
        Err(_) => format!("HTTP {status} error - unable to read response body"),
    };

    if let Some(id) = request_id {
        described.push_str(&format!(" [Request ID: {id}]"));
    }
    described
}

/// Reads the `Retry-After` header as a whole-seconds delay hint.
pub(crate) fn retry_after_hint(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
