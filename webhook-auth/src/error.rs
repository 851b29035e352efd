//! Error types for the `webhook-auth` crate.
//!
//! Follows the same pattern as the rest of the workspace: a root `Error` struct holding an
//! error kind tree plus an optional source for error chaining. There are only two top-level
//! kinds. Signing failures are internal errors for the caller; verification failures mean
//! the request must be rejected as unauthenticated.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for webhook-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in webhook-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Sign(SignErrorKind),
    Verification(VerificationErrorKind),
}

/// Reasons a signature could not be produced.
#[derive(Debug, PartialEq)]
pub enum SignErrorKind {
    InvalidPayload,
    InvalidSecret,
    Encoding,
}

/// Reasons a signature was rejected.
#[derive(Debug, PartialEq)]
pub enum VerificationErrorKind {
    InvalidSignature,
    MalformedSignature,
    AlgorithmMismatch,
    MissingSecret,
    InvalidSecret,
    InvalidPayload,
    TimestampExpired,
    InvalidToken,
}

impl Error {
    /// True when this is a signing failure.
    pub fn is_sign(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Sign(_))
    }

    /// True when this is a verification failure.
    pub fn is_verification(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Verification(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Sign(kind) => write!(f, "Webhook sign error: {:?}", kind)?,
            ErrorKind::Verification(kind) => write!(f, "Webhook verification error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Helper function to create signing errors.
pub fn sign_error(kind: SignErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Sign(kind),
    }
}

/// Helper function to create verification errors.
pub fn verification_error(kind: VerificationErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Verification(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = verification_error(VerificationErrorKind::TimestampExpired, "too old");
        assert_eq!(
            err.to_string(),
            "Webhook verification error: TimestampExpired (too old)"
        );
    }

    #[test]
    fn test_kind_predicates() {
        let sign = sign_error(SignErrorKind::InvalidPayload, "not an object");
        assert!(sign.is_sign());
        assert!(!sign.is_verification());

        let verify = verification_error(VerificationErrorKind::InvalidSignature, "mismatch");
        assert!(verify.is_verification());
        assert!(!verify.is_sign());
    }

    #[test]
    fn test_source_is_chained() {
        let err = sign_error(SignErrorKind::Encoding, "boom");
        assert_eq!(StdError::source(&err).map(|s| s.to_string()), Some("boom".to_string()));
    }
}
