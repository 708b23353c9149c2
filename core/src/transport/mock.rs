//! Mock transport
//!
//! Scripted transport for tests and local development. Responses are played
//! back in the order they were queued; an exhausted script behaves like a
//! transport failure.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{TransportError, VerifyTransport, WireResponse};

/// Transport that replays a queued script of responses.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<WireResponse, TransportError>>>,
    calls: Mutex<u32>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to be returned by the next exchange.
    pub fn push_response(&self, response: WireResponse) {
        self.script.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError(message.into())));
    }

    /// Number of exchanges performed so far.
    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl VerifyTransport for MockTransport {
    async fn post_solution(
        &self,
        _url: &str,
        _api_key: &str,
        _solution: &str,
    ) -> Result<WireResponse, TransportError> {
        *self.calls.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
    }
}
