//! Client configuration
//!
//! Plain settings holder consumed by the verification engine. Constructed
//! once per client; the client normalizes the domain and treats the
//! configuration as read-only afterwards.

use crate::errors::Error;

/// Default verification endpoint.
pub const GLOBAL_DOMAIN: &str = "api.privatecaptcha.com";

/// EU-resident verification endpoint.
pub const EU_DOMAIN: &str = "api.eu.privatecaptcha.com";

/// Form field holding the captcha solution in inbound requests.
pub const DEFAULT_FORM_FIELD: &str = "private-captcha-solution";

/// Status code the middleware returns when verification fails.
pub const DEFAULT_FAILED_STATUS_CODE: u16 = 403;

/// Settings for the Private Captcha client
#[derive(Debug, Clone)]
pub struct Config {
    /// Hostname of the verification endpoint. Scheme prefixes and a trailing
    /// slash are stripped at client construction.
    pub domain: String,
    /// API key credential. Required; an empty key fails client construction.
    pub api_key: String,
    /// Form field name used to locate the solution in an inbound request.
    pub form_field: String,
    /// HTTP status returned by the middleware on verification failure.
    pub failed_status_code: u16,
    /// Ceiling for the computed retry backoff delay.
    pub max_backoff_seconds: u64,
    /// Maximum number of verification attempts.
    pub attempts: u32,
    /// Timeout for a single HTTP exchange.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: GLOBAL_DOMAIN.to_string(),
            api_key: String::new(),
            form_field: DEFAULT_FORM_FIELD.to_string(),
            failed_status_code: DEFAULT_FAILED_STATUS_CODE,
            max_backoff_seconds: 20,
            attempts: 5,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Create a configuration with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create configuration from environment variables
    ///
    /// `PRIVATE_CAPTCHA_API_KEY` is required. `PRIVATE_CAPTCHA_DOMAIN`,
    /// `PRIVATE_CAPTCHA_FORM_FIELD`, `PRIVATE_CAPTCHA_FAILED_STATUS_CODE`,
    /// `PRIVATE_CAPTCHA_MAX_BACKOFF_SECONDS`, `PRIVATE_CAPTCHA_ATTEMPTS` and
    /// `PRIVATE_CAPTCHA_REQUEST_TIMEOUT_SECS` override the defaults when set.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("PRIVATE_CAPTCHA_API_KEY").map_err(|_| Error::EmptyApiKey)?;
        if api_key.is_empty() {
            return Err(Error::EmptyApiKey);
        }

        let defaults = Self::default();
        Ok(Self {
            domain: std::env::var("PRIVATE_CAPTCHA_DOMAIN").unwrap_or(defaults.domain),
            api_key,
            form_field: std::env::var("PRIVATE_CAPTCHA_FORM_FIELD").unwrap_or(defaults.form_field),
            failed_status_code: std::env::var("PRIVATE_CAPTCHA_FAILED_STATUS_CODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.failed_status_code),
            max_backoff_seconds: std::env::var("PRIVATE_CAPTCHA_MAX_BACKOFF_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_backoff_seconds),
            attempts: std::env::var("PRIVATE_CAPTCHA_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.attempts),
            request_timeout_secs: std::env::var("PRIVATE_CAPTCHA_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        })
    }

    /// Set the verification endpoint domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the form field name.
    pub fn with_form_field(mut self, form_field: impl Into<String>) -> Self {
        self.form_field = form_field.into();
        self
    }

    /// Set the status code returned by the middleware on failure.
    pub fn with_failed_status_code(mut self, status_code: u16) -> Self {
        self.failed_status_code = status_code;
        self
    }

    /// Set the backoff ceiling in seconds.
    pub fn with_max_backoff_seconds(mut self, seconds: u64) -> Self {
        self.max_backoff_seconds = seconds;
        self
    }

    /// Set the maximum number of verification attempts.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

/// Normalize an endpoint domain by stripping scheme prefixes and a trailing
/// slash. Empty input falls back to the global domain.
pub(crate) fn normalize_domain(domain: &str) -> String {
    if domain.is_empty() {
        return GLOBAL_DOMAIN.to_string();
    }

    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    domain.strip_suffix('/').unwrap_or(domain).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.domain, GLOBAL_DOMAIN);
        assert_eq!(config.form_field, DEFAULT_FORM_FIELD);
        assert_eq!(config.failed_status_code, DEFAULT_FAILED_STATUS_CODE);
        assert_eq!(config.max_backoff_seconds, 20);
        assert_eq!(config.attempts, 5);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(
            normalize_domain("https://custom.domain.com/"),
            "custom.domain.com"
        );
        assert_eq!(normalize_domain("http://plain.example"), "plain.example");
        assert_eq!(normalize_domain("bare.example"), "bare.example");
        assert_eq!(normalize_domain(""), GLOBAL_DOMAIN);
    }

    #[test]
    fn test_config_from_env() {
        // Clean up any existing env vars first
        std::env::remove_var("PRIVATE_CAPTCHA_DOMAIN");
        std::env::remove_var("PRIVATE_CAPTCHA_ATTEMPTS");
        std::env::remove_var("PRIVATE_CAPTCHA_MAX_BACKOFF_SECONDS");
        std::env::remove_var("PRIVATE_CAPTCHA_API_KEY");

        // Missing key is a construction-time error
        assert!(matches!(Config::from_env(), Err(Error::EmptyApiKey)));

        std::env::set_var("PRIVATE_CAPTCHA_API_KEY", "env-key");

        let config = Config::from_env().unwrap();
        assert_eq!(config.api_key, "env-key");
        // These use default values since we didn't set env vars
        assert_eq!(config.domain, GLOBAL_DOMAIN);
        assert_eq!(config.attempts, 5);

        std::env::remove_var("PRIVATE_CAPTCHA_API_KEY");
    }
}
