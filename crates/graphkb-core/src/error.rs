//! Error taxonomy for knowledge-graph retrieval

use thiserror::Error;

/// Failures a retrieval or query call can report
///
/// `InvalidParameter` is raised before any network call. The remaining three
/// are environmental; the convenience search paths swallow them and return no
/// documents, while the raw query path propagates them.
#[derive(Debug, Error)]
pub enum KbError {
    /// Caller input was malformed or out of range
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Could not connect to the endpoint
    #[error("SPARQL endpoint unreachable: {0}")]
    EndpointUnreachable(String),

    /// Endpoint answered with a protocol-level error
    #[error("SPARQL endpoint error (HTTP {status}): {message}")]
    EndpointError { status: u16, message: String },

    /// Round trip exceeded the configured execution timeout
    #[error("SPARQL query timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl KbError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for endpoint-side failures, false for rejected input
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidParameter { .. })
    }

    /// Classify a transport error from the HTTP client
    pub(crate) fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_ms }
        } else if err.is_connect() || err.is_request() {
            Self::EndpointUnreachable(err.to_string())
        } else {
            Self::EndpointError {
                status: err.status().map_or(0, |s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

/// Result type for graphkb-core operations
pub type Result<T> = std::result::Result<T, KbError>;
