//! HTTP transport abstraction
//!
//! The verification engine issues one HTTP exchange per attempt through the
//! [`VerifyTransport`] trait. Production code uses the reqwest-backed
//! [`HttpTransport`]; tests inject the scripted [`MockTransport`].

use async_trait::async_trait;
use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

/// Header carrying the API key credential.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Header carrying the server's correlation id.
pub const TRACE_ID_HEADER: &str = "X-Trace-ID";

/// Header carrying the server-requested cooldown on 429 responses.
pub const RETRY_AFTER_HEADER: &str = "Retry-After";

/// Informational rate limit header, logged only.
pub const RATE_LIMIT_HEADER: &str = "X-RateLimit-Limit";

/// Transport-level failure (connection, timeout, DNS). Always retriable.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// A completed HTTP exchange, reduced to the fields the engine consumes.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Retry-After` header value.
    pub retry_after: Option<String>,
    /// Raw `X-RateLimit-Limit` header value.
    pub rate_limit: Option<String>,
    /// Raw `X-Trace-ID` header value.
    pub trace_id: Option<String>,
    /// Response body.
    pub body: String,
}

impl WireResponse {
    /// A response with the given status and body and no extra headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            rate_limit: None,
            trace_id: None,
            body: body.into(),
        }
    }

    /// Attach a `Retry-After` header value in seconds.
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds.to_string());
        self
    }

    /// Attach a trace id header value.
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// One HTTP exchange against the verification service
///
/// Implementations own timeouts and connection management; exceeding a
/// timeout surfaces as a [`TransportError`], which the engine classifies as
/// retriable.
#[async_trait]
pub trait VerifyTransport: Send + Sync {
    /// POST the raw solution as a plain-text body to the verification
    /// endpoint.
    async fn post_solution(
        &self,
        url: &str,
        api_key: &str,
        solution: &str,
    ) -> Result<WireResponse, TransportError>;
}
