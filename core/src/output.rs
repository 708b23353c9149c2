//! Verification outcome
//!
//! The decoded result of a completed verification cycle. A 2xx response body
//! with `success == false` is a server-side rejection, not a client error:
//! the solution was well formed but semantically invalid, and the `code`
//! field says why.

use serde::Deserialize;

/// Enumerated verification error codes reported by the server.
///
/// Code 0 means no error. Unknown codes are preserved as `Unrecognized` and
/// render the generic `"error"` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyCode {
    NoError,
    Other,
    DuplicateSolutions,
    InvalidSolution,
    BadSolutionFormat,
    PuzzleExpired,
    InvalidProperty,
    OwnerMismatch,
    VerifiedBefore,
    MaintenanceMode,
    TestProperty,
    Integrity,
    OrgScope,
    Unrecognized(u16),
}

impl VerifyCode {
    /// Map a wire integer to its code.
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => VerifyCode::NoError,
            1 => VerifyCode::Other,
            2 => VerifyCode::DuplicateSolutions,
            3 => VerifyCode::InvalidSolution,
            4 => VerifyCode::BadSolutionFormat,
            5 => VerifyCode::PuzzleExpired,
            6 => VerifyCode::InvalidProperty,
            7 => VerifyCode::OwnerMismatch,
            8 => VerifyCode::VerifiedBefore,
            9 => VerifyCode::MaintenanceMode,
            10 => VerifyCode::TestProperty,
            11 => VerifyCode::Integrity,
            12 => VerifyCode::OrgScope,
            other => VerifyCode::Unrecognized(other),
        }
    }

    /// The wire integer for this code.
    pub fn as_code(self) -> u16 {
        match self {
            VerifyCode::NoError => 0,
            VerifyCode::Other => 1,
            VerifyCode::DuplicateSolutions => 2,
            VerifyCode::InvalidSolution => 3,
            VerifyCode::BadSolutionFormat => 4,
            VerifyCode::PuzzleExpired => 5,
            VerifyCode::InvalidProperty => 6,
            VerifyCode::OwnerMismatch => 7,
            VerifyCode::VerifiedBefore => 8,
            VerifyCode::MaintenanceMode => 9,
            VerifyCode::TestProperty => 10,
            VerifyCode::Integrity => 11,
            VerifyCode::OrgScope => 12,
            VerifyCode::Unrecognized(other) => other,
        }
    }

    /// Stable short identifier used for user-facing messages.
    pub fn message(self) -> &'static str {
        match self {
            VerifyCode::NoError => "",
            VerifyCode::Other => "error-other",
            VerifyCode::DuplicateSolutions => "solution-duplicates",
            VerifyCode::InvalidSolution => "solution-invalid",
            VerifyCode::BadSolutionFormat => "solution-bad-format",
            VerifyCode::PuzzleExpired => "puzzle-expired",
            VerifyCode::InvalidProperty => "property-invalid",
            VerifyCode::OwnerMismatch => "property-owner-mismatch",
            VerifyCode::VerifiedBefore => "solution-verified-before",
            VerifyCode::MaintenanceMode => "maintenance-mode",
            VerifyCode::TestProperty => "property-test",
            VerifyCode::Integrity => "integrity-error",
            VerifyCode::OrgScope => "org-scope-error",
            VerifyCode::Unrecognized(_) => "error",
        }
    }
}

/// Wire shape of a 2xx verification response body.
#[derive(Debug, Deserialize)]
pub(crate) struct WireOutput {
    pub success: bool,
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Result of a completed verification cycle
#[derive(Debug, Clone)]
pub struct VerifyOutput {
    /// Whether the solution verified successfully.
    pub success: bool,
    /// Error code reported by the server.
    pub code: VerifyCode,
    /// Originating site/domain reported by the server.
    pub origin: Option<String>,
    /// Server-reported time of verification.
    pub timestamp: Option<String>,
    /// Correlation id from the response headers, when present.
    pub trace_id: Option<String>,
    /// 1-based count of attempts consumed to reach this outcome.
    pub attempt: u32,
}

impl VerifyOutput {
    pub(crate) fn from_wire(wire: WireOutput, trace_id: Option<String>, attempt: u32) -> Self {
        Self {
            success: wire.success,
            code: VerifyCode::from_code(wire.code),
            origin: wire.origin,
            timestamp: wire.timestamp,
            trace_id,
            attempt,
        }
    }

    /// True when the solution verified with no error code.
    pub fn is_ok(&self) -> bool {
        self.success && self.code == VerifyCode::NoError
    }

    /// User-facing message for the outcome's error code.
    pub fn error_message(&self) -> &'static str {
        self.code.message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_messages() {
        assert_eq!(VerifyCode::from_code(3).message(), "solution-invalid");
        assert_eq!(VerifyCode::from_code(0).message(), "");
        assert_eq!(VerifyCode::from_code(12).message(), "org-scope-error");
        // Unrecognized codes fall back to the generic message
        assert_eq!(VerifyCode::from_code(999).message(), "error");
        assert_eq!(VerifyCode::from_code(999).as_code(), 999);
    }

    #[test]
    fn test_code_roundtrip() {
        for code in 0..13 {
            assert_eq!(VerifyCode::from_code(code).as_code(), code);
        }
    }

    #[test]
    fn test_from_wire() {
        let wire: WireOutput = serde_json::from_str(
            r#"{"success": true, "code": 0, "origin": "example.com", "timestamp": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let output = VerifyOutput::from_wire(wire, Some("test-123".to_string()), 2);

        assert!(output.success);
        assert!(output.is_ok());
        assert_eq!(output.code, VerifyCode::NoError);
        assert_eq!(output.origin.as_deref(), Some("example.com"));
        assert_eq!(output.timestamp.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(output.trace_id.as_deref(), Some("test-123"));
        assert_eq!(output.attempt, 2);
    }

    #[test]
    fn test_from_wire_defaults() {
        // Absent code defaults to 0, optional fields to None
        let wire: WireOutput = serde_json::from_str(r#"{"success": false}"#).unwrap();
        let output = VerifyOutput::from_wire(wire, None, 1);

        assert!(!output.success);
        assert_eq!(output.code, VerifyCode::NoError);
        assert!(output.origin.is_none());
        assert!(!output.is_ok());
    }

    #[test]
    fn test_success_with_nonzero_code_is_not_ok() {
        let wire: WireOutput =
            serde_json::from_str(r#"{"success": true, "code": 10}"#).unwrap();
        let output = VerifyOutput::from_wire(wire, None, 1);

        assert!(output.success);
        assert_eq!(output.code, VerifyCode::TestProperty);
        assert!(!output.is_ok());
        assert_eq!(output.error_message(), "property-test");
    }
}
