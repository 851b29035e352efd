//! `timestampScheme` verifier: replay-resistant `t=<ms>,v1=<hex>` signatures.
//!
//! The HMAC-SHA256 covers `"<timestamp>.<payload>"`, so the timestamp that gets checked
//! against the tolerance window cannot be changed without breaking the signature.

use super::{
    ensure_match, is_lowercase_hex, sign_key_error, signing_input, verification_input,
    verify_key_error, HmacAlgorithm,
};
use crate::canonical::Payload;
use crate::common::{Verifier, VerifyOptions};
use crate::error::{
    sign_error, verification_error, Error, SignErrorKind, VerificationErrorKind,
};
use crate::registry::VerifierType;

const SCHEME_VERSION: &str = "v1";

#[derive(Debug, Clone, Default)]
pub struct TimestampSchemeVerifier {
    options: VerifyOptions,
}

/// The parts of a `t=...,v1=...` header.
#[derive(Debug, PartialEq)]
struct SchemeSignature<'a> {
    timestamp: i64,
    digest: &'a str,
}

impl TimestampSchemeVerifier {
    pub fn new(options: VerifyOptions) -> Self {
        Self { options }
    }

    fn signed_message(timestamp: i64, payload: &str) -> String {
        format!("{}.{}", timestamp, payload)
    }
}

fn parse(signature: &str) -> Result<SchemeSignature<'_>, Error> {
    let mut timestamp = None;
    let mut digest = None;

    for part in signature.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) if timestamp.is_none() => timestamp = Some(value),
            Some((SCHEME_VERSION, value)) if digest.is_none() => digest = Some(value),
            _ => {}
        }
    }

    let malformed = || {
        verification_error(
            VerificationErrorKind::MalformedSignature,
            "Expected a signature of the form t=<timestamp>,v1=<hex digest>",
        )
    };

    let timestamp = timestamp
        .filter(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|t| t.parse::<i64>().ok())
        .ok_or_else(malformed)?;
    let digest = digest
        .filter(|d| is_lowercase_hex(d))
        .ok_or_else(malformed)?;

    Ok(SchemeSignature { timestamp, digest })
}

impl Verifier for TimestampSchemeVerifier {
    fn sign(&self, payload: &Payload, secret: &str) -> Result<String, Error> {
        if secret.is_empty() {
            return Err(sign_error(
                SignErrorKind::InvalidSecret,
                "A secret is required for the timestampScheme verifier",
            ));
        }

        let timestamp = self.options.effective_now();
        let payload = signing_input(payload)?;
        let tag = HmacAlgorithm::Sha256
            .digest(
                secret.as_bytes(),
                Self::signed_message(timestamp, &payload).as_bytes(),
            )
            .map_err(sign_key_error)?;

        Ok(format!(
            "t={},{}={}",
            timestamp,
            SCHEME_VERSION,
            hex::encode(tag)
        ))
    }

    fn verify(&self, payload: &Payload, secret: &str, signature: &str) -> Result<(), Error> {
        if secret.is_empty() {
            return Err(verification_error(
                VerificationErrorKind::MissingSecret,
                "A secret is required for the timestampScheme verifier",
            ));
        }

        let parsed = parse(signature)?;

        if !self.options.is_within_tolerance(parsed.timestamp) {
            log::debug!(
                "Rejected webhook signature: timestamp {} outside tolerance of {}ms",
                parsed.timestamp,
                self.options.tolerance()
            );
            return Err(verification_error(
                VerificationErrorKind::TimestampExpired,
                "Signature timestamp is outside the tolerance window",
            ));
        }

        let provided = hex::decode(parsed.digest).map_err(|e| {
            verification_error(
                VerificationErrorKind::MalformedSignature,
                &format!("Signature digest is not valid hex: {}", e),
            )
        })?;

        let payload = verification_input(payload)?;
        let matched = HmacAlgorithm::Sha256
            .matches(
                secret.as_bytes(),
                Self::signed_message(parsed.timestamp, &payload).as_bytes(),
                &provided,
            )
            .map_err(verify_key_error)?;
        ensure_match(matched)
    }

    fn verifier_type(&self) -> VerifierType {
        VerifierType::TimestampScheme
    }
}
