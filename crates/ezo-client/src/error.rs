//! Client error types.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the EZOfficeInventory API.
#[derive(Debug, Error)]
pub enum EzoError {
    /// Caller input was rejected before any request was sent.
    #[error("invalid input for '{field}': {reason}")]
    Precondition {
        /// Name of the offending field or parameter.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Connection, timeout, or other transport failure.
    #[error("could not {operation}: {source}")]
    Transport {
        /// Human-readable operation, e.g. `get assets`.
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The API returned a non-success status code.
    #[error("could not {operation}: HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        /// HTTP status code returned by the API.
        status: u16,
        /// Raw response body.
        body: String,
        /// Parsed `Retry-After` header on 429 responses.
        retry_after_secs: Option<u64>,
        /// Records accumulated from earlier pages of a listing, or
        /// `Value::Null` for single-request operations.
        partial: Value,
    },

    /// A success response was missing an expected field or had the wrong shape.
    #[error("could not {operation}: response field '{field}' is missing or malformed")]
    Protocol {
        operation: &'static str,
        field: &'static str,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("could not {operation}: invalid JSON response: {reason}")]
    Decode {
        operation: &'static str,
        reason: String,
    },

    /// The client configuration is incomplete or invalid.
    #[error(transparent)]
    Config(#[from] ezo_config::ConfigError),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl EzoError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::Precondition {
            field: field.into(),
            reason: "is required".into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Precondition {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) const fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { operation, source }
    }

    /// Attach records gathered before a non-success page to a status error.
    pub(crate) fn with_partial(self, collected: Value) -> Self {
        match self {
            Self::Status {
                operation,
                status,
                body,
                retry_after_secs,
                ..
            } => Self::Status {
                operation,
                status,
                body,
                retry_after_secs,
                partial: collected,
            },
            other => other,
        }
    }

    /// Records collected before a listing hit a non-success status.
    ///
    /// Returns `None` for every other error kind, and for status errors from
    /// single-request operations.
    pub fn partial(&self) -> Option<&Value> {
        match self {
            Self::Status { partial, .. } if !partial.is_null() => Some(partial),
            _ => None,
        }
    }

    /// HTTP status code, if the API answered with a non-success status.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error was raised before any request reached the network.
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. } | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_error() -> EzoError {
        EzoError::Status {
            operation: "get assets",
            status: 500,
            body: "boom".into(),
            retry_after_secs: None,
            partial: Value::Null,
        }
    }

    #[test]
    fn with_partial_attaches_collected_records() {
        let err = status_error().with_partial(json!([{"id": 1}]));
        assert_eq!(err.partial(), Some(&json!([{"id": 1}])));
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn single_request_status_error_has_no_partial() {
        assert!(status_error().partial().is_none());
    }

    #[test]
    fn with_partial_leaves_other_errors_alone() {
        let err = EzoError::missing("fixed_asset[name]").with_partial(json!([1]));
        assert!(err.partial().is_none());
        assert!(err.is_precondition());
    }

    #[test]
    fn display_names_the_operation() {
        let message = status_error().to_string();
        assert_eq!(message, "could not get assets: HTTP 500: boom");
    }
}
