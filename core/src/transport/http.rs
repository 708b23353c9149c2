//! Reqwest-backed transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tracing::debug;

use super::{
    TransportError, VerifyTransport, WireResponse, API_KEY_HEADER, RATE_LIMIT_HEADER,
    RETRY_AFTER_HEADER, TRACE_ID_HEADER,
};

/// User agent identifying this client and version.
const USER_AGENT: &str = concat!("private-captcha-rust/", env!("CARGO_PKG_VERSION"));

/// Production transport over reqwest with rustls TLS.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Self { client })
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

#[async_trait]
impl VerifyTransport for HttpTransport {
    async fn post_solution(
        &self,
        url: &str,
        api_key: &str,
        solution: &str,
    ) -> Result<WireResponse, TransportError> {
        debug!(url, method = "POST", "sending HTTP request");

        // The solution goes out as opaque plain text, not JSON.
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(solution.to_owned())
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let retry_after = header_value(&response, RETRY_AFTER_HEADER);
        let rate_limit = header_value(&response, RATE_LIMIT_HEADER);
        let trace_id = header_value(&response, TRACE_ID_HEADER);

        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(WireResponse {
            status,
            retry_after,
            rate_limit,
            trace_id,
            body,
        })
    }
}
