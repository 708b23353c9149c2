//! Error types for captcha verification
//!
//! Only four failure kinds cross the engine boundary: a missing API key at
//! construction, an empty solution, a fatal HTTP status, and exhausted
//! retries. Attempt-level failures are absorbed inside the retry loop and
//! summarized in the terminal error. All values carry an optional trace id
//! for cross-system correlation.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by the Private Captcha client
#[derive(Debug, Error)]
pub enum Error {
    /// The API key was not provided or is empty. Never retried.
    #[error("API key is empty")]
    EmptyApiKey,

    /// The caller supplied an empty or absent solution. Never reaches the
    /// network.
    #[error("solution is empty")]
    EmptySolution,

    /// A completed HTTP exchange returned a non-2xx status outside the
    /// retriable set. Surfaced immediately, no further attempts.
    #[error("HTTP error {status}")]
    Http {
        status: u16,
        retry_after: Option<u64>,
        trace_id: Option<String>,
    },

    /// Every attempt exhausted without success.
    #[error("{message}")]
    VerificationFailed {
        message: String,
        attempts: u32,
        trace_id: Option<String>,
    },

    /// The HTTP transport could not be constructed.
    #[error("failed to build HTTP transport: {0}")]
    Transport(TransportError),
}

impl Error {
    /// Correlation id reported by the server, when one was seen.
    pub fn trace_id(&self) -> Option<&str> {
        match self {
            Error::Http { trace_id, .. } | Error::VerificationFailed { trace_id, .. } => {
                trace_id.as_deref()
            }
            _ => None,
        }
    }
}

/// An attempt failed but another attempt may succeed. Internal to the retry
/// loop; never escapes the engine.
#[derive(Debug, Error)]
pub(crate) enum RetriableError {
    /// Connection, timeout or DNS failure below the HTTP layer.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Retriable HTTP status (429, 5xx, 408, 425).
    #[error("HTTP error {status}")]
    Http {
        status: u16,
        retry_after: Option<u64>,
        trace_id: Option<String>,
    },

    /// A 2xx response body that could not be decoded.
    #[error("failed to decode response: {source}")]
    Decode {
        source: serde_json::Error,
        trace_id: Option<String>,
    },
}

impl RetriableError {
    pub(crate) fn trace_id(&self) -> Option<&str> {
        match self {
            RetriableError::Transport(_) => None,
            RetriableError::Http { trace_id, .. } | RetriableError::Decode { trace_id, .. } => {
                trace_id.as_deref()
            }
        }
    }

    /// Server-requested cooldown from the most recent 429 response.
    pub(crate) fn retry_after(&self) -> Option<u64> {
        match self {
            RetriableError::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_attributes() {
        let error = Error::Http {
            status: 404,
            retry_after: None,
            trace_id: Some("trace-1".to_string()),
        };
        assert_eq!(error.to_string(), "HTTP error 404");
        assert_eq!(error.trace_id(), Some("trace-1"));
    }

    #[test]
    fn test_retriable_retry_after() {
        let error = RetriableError::Http {
            status: 429,
            retry_after: Some(60),
            trace_id: None,
        };
        assert_eq!(error.retry_after(), Some(60));
        assert_eq!(error.to_string(), "HTTP error 429");

        let transport = RetriableError::Transport(TransportError("connection refused".into()));
        assert_eq!(transport.retry_after(), None);
    }

    #[test]
    fn test_empty_errors_have_no_trace_id() {
        assert_eq!(Error::EmptyApiKey.trace_id(), None);
        assert_eq!(Error::EmptySolution.to_string(), "solution is empty");
    }
}
