//! Shared constants, the [`Verifier`] contract and [`VerifyOptions`].

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use crate::canonical::Payload;
use crate::error::Error;
use crate::registry::VerifierType;

/// Header the framework's own signatures travel in. Lookups are case-insensitive.
pub const DEFAULT_SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// Default replay window in milliseconds (5 minutes).
pub const DEFAULT_TOLERANCE: u64 = 300_000;

/// Rewrites a provider-specific signature header into the value a verifier expects.
pub type SignatureTransformer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A signing and verification strategy.
///
/// Verifiers are stateless apart from the options captured when they were created, so one
/// instance can be shared between threads.
pub trait Verifier: Send + Sync {
    /// Produce a signature for the payload.
    fn sign(&self, payload: &Payload, secret: &str) -> Result<String, Error>;

    /// Check a signature. A rejected signature is always an `Err`, never a silent `false`.
    fn verify(&self, payload: &Payload, secret: &str, signature: &str) -> Result<(), Error>;

    /// The registry name this verifier was built for.
    fn verifier_type(&self) -> VerifierType;
}

/// Per-call configuration shared by the verifiers and the event adapter.
#[derive(Clone, Default)]
pub struct VerifyOptions {
    /// Header carrying the signature, defaults to [`DEFAULT_SIGNATURE_HEADER`].
    pub signature_header: Option<String>,
    /// Applied to the raw header value before verification.
    pub signature_transformer: Option<SignatureTransformer>,
    /// Fixed "now" in Unix milliseconds.
    pub current_timestamp_override: Option<i64>,
    /// Sender-asserted event time in Unix milliseconds.
    pub event_timestamp: Option<i64>,
    /// Maximum clock difference in milliseconds, defaults to [`DEFAULT_TOLERANCE`].
    pub tolerance: Option<u64>,
    /// JWT issuer claim to attach and require.
    pub issuer: Option<String>,
    /// Secret used when a call does not pass one explicitly.
    pub default_secret: Option<SecretString>,
}

impl VerifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signature_header(mut self, header: impl Into<String>) -> Self {
        self.signature_header = Some(header.into());
        self
    }

    pub fn with_signature_transformer<F>(mut self, transformer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.signature_transformer = Some(Arc::new(transformer));
        self
    }

    pub fn with_current_timestamp_override(mut self, timestamp_ms: i64) -> Self {
        self.current_timestamp_override = Some(timestamp_ms);
        self
    }

    pub fn with_event_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.event_timestamp = Some(timestamp_ms);
        self
    }

    pub fn with_tolerance(mut self, tolerance_ms: u64) -> Self {
        self.tolerance = Some(tolerance_ms);
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_default_secret(mut self, secret: SecretString) -> Self {
        self.default_secret = Some(secret);
        self
    }

    pub fn signature_header(&self) -> &str {
        self.signature_header
            .as_deref()
            .unwrap_or(DEFAULT_SIGNATURE_HEADER)
    }

    pub fn tolerance(&self) -> u64 {
        self.tolerance.unwrap_or(DEFAULT_TOLERANCE)
    }

    /// The override when set, otherwise the wall clock.
    pub fn effective_now(&self) -> i64 {
        self.current_timestamp_override
            .unwrap_or_else(|| Utc::now().timestamp_millis())
    }

    /// Whether `timestamp_ms` lies within the tolerance of [`Self::effective_now`].
    pub fn is_within_tolerance(&self, timestamp_ms: i64) -> bool {
        self.effective_now().abs_diff(timestamp_ms) <= self.tolerance()
    }

    pub fn transform_signature(&self, raw: &str) -> String {
        match &self.signature_transformer {
            Some(transformer) => transformer(raw),
            None => raw.to_string(),
        }
    }

    /// Picks the explicit secret when given, then the configured fallback, then `""`.
    /// An explicit secret is never replaced by the fallback, even when empty.
    pub(crate) fn resolve_secret(&self, secret: Option<&str>) -> String {
        secret
            .map(str::to_string)
            .or_else(|| {
                self.default_secret
                    .as_ref()
                    .map(|s| s.expose_secret().to_string())
            })
            .unwrap_or_default()
    }
}

impl fmt::Debug for VerifyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyOptions")
            .field("signature_header", &self.signature_header)
            .field(
                "signature_transformer",
                &self.signature_transformer.as_ref().map(|_| "<fn>"),
            )
            .field("current_timestamp_override", &self.current_timestamp_override)
            .field("event_timestamp", &self.event_timestamp)
            .field("tolerance", &self.tolerance)
            .field("issuer", &self.issuer)
            .field("default_secret", &self.default_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
