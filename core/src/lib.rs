//! # Private Captcha Core
//!
//! Client library for verifying Private Captcha solutions against the
//! verification service. This crate contains the verification engine with
//! retry and exponential backoff, the error taxonomy, the decoded
//! verification outcome, and the request adapter used by web-framework
//! integrations.
//!
//! ## Example
//!
//! ```no_run
//! use pc_core::{Client, Config};
//!
//! # async fn run() -> Result<(), pc_core::Error> {
//! let client = Client::new(Config::new("my-api-key"))?;
//! let output = client.verify("solution-payload").await?;
//! if output.is_ok() {
//!     println!("verified, origin: {:?}", output.origin);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod output;
pub mod request;
pub mod transport;

// Re-export commonly used types for convenience
pub use client::{Client, VerifyOptions};
pub use config::{Config, EU_DOMAIN, GLOBAL_DOMAIN};
pub use errors::Error;
pub use output::{VerifyCode, VerifyOutput};
pub use request::CaptchaRequest;
pub use transport::{HttpTransport, MockTransport, TransportError, VerifyTransport, WireResponse};
