//! Request adapter
//!
//! Extracts the captcha solution from an arbitrary inbound request object and
//! delegates to the verification engine. Framework integrations implement
//! [`CaptchaRequest`] over their request types.

use std::collections::HashMap;

use crate::client::Client;
use crate::errors::Error;
use crate::output::VerifyOutput;

/// Inbound request exposing the captcha solution field
///
/// Implementors provide at least one of the two capabilities. The adapter
/// prefers the parameter-map lookup and falls back to direct indexing.
pub trait CaptchaRequest {
    /// Parameter-map lookup by field name (query or form parameters).
    fn lookup_by_key(&self, key: &str) -> Option<String> {
        let _ = key;
        None
    }

    /// Direct indexing by field name.
    fn index_by_key(&self, key: &str) -> Option<String> {
        let _ = key;
        None
    }
}

impl CaptchaRequest for HashMap<String, String> {
    fn lookup_by_key(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Client {
    /// Verify the solution carried by an inbound request.
    ///
    /// Fails with whatever [`Client::verify`] fails with. A missing or empty
    /// field value is an empty solution. An outcome with `success == false`
    /// is upgraded to [`Error::VerificationFailed`] here: the caller has no
    /// further recourse at this layer.
    pub async fn verify_request<R>(&self, request: &R) -> Result<VerifyOutput, Error>
    where
        R: CaptchaRequest + ?Sized,
    {
        self.verify_request_field(request, None).await
    }

    /// Verify the solution carried by an inbound request, reading the given
    /// field name instead of the configured one.
    pub async fn verify_request_field<R>(
        &self,
        request: &R,
        form_field: Option<&str>,
    ) -> Result<VerifyOutput, Error>
    where
        R: CaptchaRequest + ?Sized,
    {
        let field = form_field.unwrap_or(&self.config.form_field);
        let solution = request
            .lookup_by_key(field)
            .or_else(|| request.index_by_key(field))
            .unwrap_or_default();

        let output = self.verify(&solution).await?;

        if !output.success {
            return Err(Error::VerificationFailed {
                message: format!("captcha verification failed: {}", output.error_message()),
                attempts: output.attempt,
                trace_id: output.trace_id.clone(),
            });
        }

        Ok(output)
    }
}
