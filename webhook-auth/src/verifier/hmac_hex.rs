//! `sha1` and `sha256` verifiers: `<algorithm>=<hex-digest>` signatures.

use super::{
    ensure_match, is_lowercase_hex, sign_key_error, signing_input, verification_input,
    verify_key_error, HmacAlgorithm,
};
use crate::canonical::Payload;
use crate::common::Verifier;
use crate::error::{verification_error, Error, VerificationErrorKind};
use crate::registry::VerifierType;

/// HMAC verifier with hex output and an algorithm prefix, as used by GitHub-style webhooks.
///
/// The secret is used as raw key bytes.
#[derive(Debug, Clone, Copy)]
pub struct HmacHexVerifier {
    algorithm: HmacAlgorithm,
}

impl HmacHexVerifier {
    pub fn new(algorithm: HmacAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn sha1() -> Self {
        Self::new(HmacAlgorithm::Sha1)
    }

    pub fn sha256() -> Self {
        Self::new(HmacAlgorithm::Sha256)
    }

    fn parse<'a>(&self, signature: &'a str) -> Result<(HmacAlgorithm, &'a str), Error> {
        let (prefix, digest) = signature.split_once('=').ok_or_else(|| {
            verification_error(
                VerificationErrorKind::MalformedSignature,
                "Expected a signature of the form <algorithm>=<hex digest>",
            )
        })?;

        let algorithm = HmacAlgorithm::from_name(prefix).ok_or_else(|| {
            verification_error(
                VerificationErrorKind::MalformedSignature,
                &format!("Unsupported signature algorithm: {}", prefix),
            )
        })?;

        // A sha256 signature must never be accepted by a sha1 verifier or the reverse.
        if algorithm != self.algorithm {
            return Err(verification_error(
                VerificationErrorKind::AlgorithmMismatch,
                &format!(
                    "Expected a {} signature but got {}",
                    self.algorithm.name(),
                    algorithm.name()
                ),
            ));
        }

        Ok((algorithm, digest))
    }
}

impl Verifier for HmacHexVerifier {
    fn sign(&self, payload: &Payload, secret: &str) -> Result<String, Error> {
        let message = signing_input(payload)?;
        let tag = self
            .algorithm
            .digest(secret.as_bytes(), message.as_bytes())
            .map_err(sign_key_error)?;
        Ok(format!("{}={}", self.algorithm.name(), hex::encode(tag)))
    }

    fn verify(&self, payload: &Payload, secret: &str, signature: &str) -> Result<(), Error> {
        let (algorithm, digest) = self.parse(signature)?;
        if !is_lowercase_hex(digest) {
            return Err(verification_error(
                VerificationErrorKind::MalformedSignature,
                "Signature digest must be lowercase hex",
            ));
        }
        let provided = hex::decode(digest).map_err(|e| {
            verification_error(
                VerificationErrorKind::MalformedSignature,
                &format!("Signature digest is not valid hex: {}", e),
            )
        })?;

        let message = verification_input(payload)?;
        let matched = algorithm
            .matches(secret.as_bytes(), message.as_bytes(), &provided)
            .map_err(verify_key_error)?;
        ensure_match(matched)
    }

    fn verifier_type(&self) -> VerifierType {
        match self.algorithm {
            HmacAlgorithm::Sha1 => VerifierType::Sha1,
            HmacAlgorithm::Sha256 => VerifierType::Sha256,
        }
    }
}
