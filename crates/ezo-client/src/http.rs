//! Shared HTTP response helpers.
//!
//! Centralizes status-code checks (non-success → [`EzoError::Status`], with
//! `Retry-After` parsing on 429) and JSON body decoding so the endpoint
//! modules stay focused on request construction.

use serde_json::Value;

use crate::error::EzoError;

/// Check an HTTP response for a non-success status.
///
/// Returns the response unchanged on success. Any other status becomes
/// [`EzoError::Status`] carrying the status code and response body. A 429
/// additionally records the `Retry-After` header (60 s if absent or
/// unparseable); no retry is attempted here.
pub async fn check_response(
    resp: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, EzoError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let retry_after_secs = (status == reqwest::StatusCode::TOO_MANY_REQUESTS)
        .then(|| parse_retry_after(&resp));
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(operation, status = status.as_u16(), "non-success response");

    Err(EzoError::Status {
        operation,
        status: status.as_u16(),
        body,
        retry_after_secs,
        partial: Value::Null,
    })
}

/// Read the whole body and parse it as JSON.
pub async fn read_json(resp: reqwest::Response, operation: &'static str) -> Result<Value, EzoError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|source| EzoError::transport(operation, source))?;
    serde_json::from_slice(&bytes).map_err(|e| EzoError::Decode {
        operation,
        reason: e.to_string(),
    })
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
