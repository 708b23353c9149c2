//! Verification engine
//!
//! Orchestrates one or more HTTP round trips against the verification
//! service, classifies failures into retriable vs. fatal, applies the
//! exponential backoff policy with server-provided cooldown hints, and
//! returns either a decoded [`VerifyOutput`] or a terminal [`Error`].
//!
//! Attempts are strictly sequential; each backoff depends on the outcome of
//! the previous attempt. The client holds no mutable state during `verify`,
//! so one instance can serve concurrent callers.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::{normalize_domain, Config};
use crate::errors::{Error, RetriableError};
use crate::output::{VerifyOutput, WireOutput};
use crate::transport::{HttpTransport, VerifyTransport};

/// Floor for the computed backoff delay.
const MIN_BACKOFF: Duration = Duration::from_millis(500);

/// Per-call overrides for the retry budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Ceiling for the computed backoff delay, in seconds.
    pub max_backoff_seconds: Option<u64>,
    /// Maximum number of verification attempts.
    pub attempts: Option<u32>,
}

/// Outcome of a single verification attempt, before retry handling.
enum AttemptFailure {
    /// Another attempt may succeed.
    Retriable(RetriableError),
    /// Terminal; the loop stops immediately.
    Fatal(Error),
}

/// Private Captcha verification client
///
/// Construction validates the API key and freezes the endpoint; the
/// configuration is read-only afterwards.
pub struct Client {
    pub(crate) config: Config,
    endpoint: String,
    transport: Arc<dyn VerifyTransport>,
}

impl Client {
    /// Create a client with the reqwest-backed transport.
    pub fn new(config: Config) -> Result<Self, Error> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let transport = HttpTransport::new(timeout).map_err(Error::Transport)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client with an injected transport.
    pub fn with_transport(
        mut config: Config,
        transport: Arc<dyn VerifyTransport>,
    ) -> Result<Self, Error> {
        if config.api_key.is_empty() {
            return Err(Error::EmptyApiKey);
        }

        config.domain = normalize_domain(&config.domain);
        let endpoint = format!("https://{}/verify", config.domain);

        Ok(Self {
            config,
            endpoint,
            transport,
        })
    }

    /// The client settings, normalized.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The verification endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Verify a captcha solution with the configured retry budget.
    ///
    /// Fails with [`Error::EmptySolution`] for an empty solution, with
    /// [`Error::Http`] when the server definitively rejects the call, and
    /// with [`Error::VerificationFailed`] when every attempt exhausts.
    /// A well-formed but semantically invalid solution is NOT an error: it
    /// yields an output with `success == false` and a specific code.
    pub async fn verify(&self, solution: &str) -> Result<VerifyOutput, Error> {
        self.verify_with(solution, VerifyOptions::default()).await
    }

    /// Verify a captcha solution with per-call overrides.
    pub async fn verify_with(
        &self,
        solution: &str,
        options: VerifyOptions,
    ) -> Result<VerifyOutput, Error> {
        if solution.is_empty() {
            return Err(Error::EmptySolution);
        }

        let max_backoff = Duration::from_secs(
            options
                .max_backoff_seconds
                .unwrap_or(self.config.max_backoff_seconds),
        );
        let max_attempts = options.attempts.unwrap_or(self.config.attempts).max(1);

        debug!(
            max_attempts,
            max_backoff_seconds = max_backoff.as_secs(),
            solution_length = solution.len(),
            "about to start verifying solution"
        );

        let mut last_error: Option<RetriableError> = None;
        let mut attempt = 0u32;

        for i in 0..max_attempts {
            attempt = i + 1;

            if i > 0 {
                let delay = backoff_delay(i, max_backoff, last_error.as_ref());
                if let Some(error) = &last_error {
                    debug!(
                        attempt,
                        backoff_seconds = delay.as_secs_f64(),
                        error = %error,
                        "failed to send verify request, retrying"
                    );
                }
                tokio::time::sleep(delay).await;
            }

            match self.attempt_verify(solution, attempt).await {
                Ok(output) => {
                    debug!(attempts = attempt, success = true, "finished verifying solution");
                    return Ok(output);
                }
                Err(AttemptFailure::Fatal(error)) => {
                    debug!(attempts = attempt, success = false, "finished verifying solution");
                    return Err(error);
                }
                Err(AttemptFailure::Retriable(error)) => last_error = Some(error),
            }
        }

        debug!(attempts = attempt, success = false, "finished verifying solution");

        let (cause, trace_id) = match &last_error {
            Some(error) => (error.to_string(), error.trace_id().map(str::to_owned)),
            None => ("no attempts were made".to_string(), None),
        };
        Err(Error::VerificationFailed {
            message: format!("verification failed after {attempt} attempts: {cause}"),
            attempts: attempt,
            trace_id,
        })
    }

    /// One HTTP exchange plus response classification.
    async fn attempt_verify(
        &self,
        solution: &str,
        attempt: u32,
    ) -> Result<VerifyOutput, AttemptFailure> {
        let response = self
            .transport
            .post_solution(&self.endpoint, &self.config.api_key, solution)
            .await
            .map_err(|error| {
                debug!(error = %error, "failed to send HTTP request");
                AttemptFailure::Retriable(RetriableError::Transport(error))
            })?;

        debug!(status = response.status, "HTTP request finished");

        let trace_id = response.trace_id.clone();
        match response.status {
            429 => {
                let retry_after = parse_retry_after(response.retry_after.as_deref());
                debug!(
                    ?retry_after,
                    rate_limit = response.rate_limit.as_deref(),
                    "rate limited by verification service"
                );
                Err(AttemptFailure::Retriable(RetriableError::Http {
                    status: 429,
                    retry_after,
                    trace_id,
                }))
            }
            500 | 502 | 503 | 504 | 408 | 425 => {
                Err(AttemptFailure::Retriable(RetriableError::Http {
                    status: response.status,
                    retry_after: None,
                    trace_id,
                }))
            }
            status @ 300..=599 => Err(AttemptFailure::Fatal(Error::Http {
                status,
                retry_after: None,
                trace_id,
            })),
            _ => match serde_json::from_str::<WireOutput>(&response.body) {
                Ok(wire) => Ok(VerifyOutput::from_wire(wire, trace_id, attempt)),
                Err(source) => {
                    debug!(error = %source, "failed to parse response");
                    Err(AttemptFailure::Retriable(RetriableError::Decode {
                        source,
                        trace_id,
                    }))
                }
            },
        }
    }
}

/// Parse a `Retry-After` header as integer seconds; absent or unparsable
/// values carry no hint.
fn parse_retry_after(header: Option<&str>) -> Option<u64> {
    header.and_then(|value| value.trim().parse().ok())
}

/// Compute the delay before the next attempt.
///
/// `prior_attempts` is the 0-based count of attempts already made. The base
/// delay doubles each retry starting from [`MIN_BACKOFF`]; a server-requested
/// cooldown from the immediately preceding 429 is never undercut; the result
/// is clamped to `max_backoff`.
fn backoff_delay(
    prior_attempts: u32,
    max_backoff: Duration,
    last_error: Option<&RetriableError>,
) -> Duration {
    let exponent = prior_attempts.min(31);
    let base = MIN_BACKOFF.saturating_mul(1u32 << exponent);

    let hint = last_error
        .and_then(RetriableError::retry_after)
        .map(Duration::from_secs)
        .unwrap_or(Duration::ZERO);

    base.max(hint).min(max_backoff)
}
