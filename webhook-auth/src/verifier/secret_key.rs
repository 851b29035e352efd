//! `secretKey` verifier: the signature is the shared secret itself.

use log::warn;

use crate::canonical::Payload;
use crate::common::Verifier;
use crate::error::{verification_error, Error, VerificationErrorKind};
use crate::registry::VerifierType;

/// Shared-secret check for static bearer-style tokens sent in a header.
///
/// **Lower assurance.** The payload is never signed and the comparison is a plain string
/// equality, not a constant-time one. Only use this for trusted, low-sensitivity
/// integrations that cannot sign their requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretKeyVerifier;

impl Verifier for SecretKeyVerifier {
    fn sign(&self, _payload: &Payload, secret: &str) -> Result<String, Error> {
        warn!("The secretKey verifier does not sign payloads; the secret is sent as the signature");
        Ok(secret.to_string())
    }

    fn verify(&self, _payload: &Payload, secret: &str, signature: &str) -> Result<(), Error> {
        if secret.is_empty() {
            return Err(verification_error(
                VerificationErrorKind::MissingSecret,
                "No secret configured for the secretKey verifier",
            ));
        }

        if signature == secret {
            Ok(())
        } else {
            Err(verification_error(
                VerificationErrorKind::InvalidSignature,
                "Provided secret does not match",
            ))
        }
    }

    fn verifier_type(&self) -> VerifierType {
        VerifierType::SecretKey
    }
}
