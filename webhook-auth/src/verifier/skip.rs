//! `none` and `skip` verifiers: explicit escape hatches that accept everything.

use log::warn;

use crate::canonical::Payload;
use crate::common::Verifier;
use crate::error::Error;
use crate::registry::VerifierType;

/// Produces empty signatures and accepts any signature.
///
/// Only reachable by asking the registry for `none` or `skip` by name. Every call logs a
/// warning so an unverified integration is visible in the logs.
#[derive(Debug, Clone, Copy)]
pub struct SkipVerifier {
    verifier_type: VerifierType,
}

impl SkipVerifier {
    pub fn new(verifier_type: VerifierType) -> Self {
        Self { verifier_type }
    }
}

impl Verifier for SkipVerifier {
    fn sign(&self, _payload: &Payload, _secret: &str) -> Result<String, Error> {
        warn!(
            "The {} verifier does not sign payloads; returning an empty signature",
            self.verifier_type
        );
        Ok(String::new())
    }

    fn verify(&self, _payload: &Payload, _secret: &str, _signature: &str) -> Result<(), Error> {
        warn!(
            "The {} verifier accepts all signatures; this webhook is not verified",
            self.verifier_type
        );
        Ok(())
    }

    fn verifier_type(&self) -> VerifierType {
        self.verifier_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_signs_empty_and_accepts_anything() {
        for verifier_type in [VerifierType::None, VerifierType::Skip] {
            let verifier = SkipVerifier::new(verifier_type);
            assert_eq!(verifier.sign(&"payload".into(), "secret").unwrap(), "");
            assert!(verifier.verify(&"payload".into(), "", "garbage").is_ok());
            assert_eq!(verifier.verifier_type(), verifier_type);
        }
    }
}
