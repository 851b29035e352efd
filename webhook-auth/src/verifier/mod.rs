//! Signing and verification strategies.
//!
//! HMAC comparisons go through `Mac::verify_slice`, which checks the tag length first and
//! then compares in constant time. The only exception is [`SecretKeyVerifier`], which is a
//! plain string equality check for low-assurance integrations.

mod base64_hmac;
mod hmac_hex;
mod jwt;
mod secret_key;
mod skip;
mod timestamp_scheme;

pub use base64_hmac::Base64HmacVerifier;
pub use hmac_hex::HmacHexVerifier;
pub use jwt::JwtVerifier;
pub use secret_key::SecretKeyVerifier;
pub use skip::SkipVerifier;
pub use timestamp_scheme::TimestampSchemeVerifier;

use std::borrow::Cow;

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

use crate::canonical::{canonicalize, Payload};
use crate::error::{sign_error, verification_error, Error, SignErrorKind, VerificationErrorKind};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Hash functions the HMAC verifiers can be built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlgorithm {
    Sha1,
    Sha256,
}

impl HmacAlgorithm {
    /// Name used in `<algorithm>=<hex>` signatures.
    pub fn name(self) -> &'static str {
        match self {
            HmacAlgorithm::Sha1 => "sha1",
            HmacAlgorithm::Sha256 => "sha256",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sha1" => Some(HmacAlgorithm::Sha1),
            "sha256" => Some(HmacAlgorithm::Sha256),
            _ => None,
        }
    }

    /// Compute the raw HMAC tag.
    pub(crate) fn digest(self, key: &[u8], message: &[u8]) -> Result<Vec<u8>, InvalidLength> {
        match self {
            HmacAlgorithm::Sha1 => {
                let mut mac = HmacSha1::new_from_slice(key)?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            HmacAlgorithm::Sha256 => {
                let mut mac = HmacSha256::new_from_slice(key)?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }
        }
    }

    /// Recompute the tag and compare it against `tag` in constant time.
    pub(crate) fn matches(
        self,
        key: &[u8],
        message: &[u8],
        tag: &[u8],
    ) -> Result<bool, InvalidLength> {
        match self {
            HmacAlgorithm::Sha1 => {
                let mut mac = HmacSha1::new_from_slice(key)?;
                mac.update(message);
                Ok(mac.verify_slice(tag).is_ok())
            }
            HmacAlgorithm::Sha256 => {
                let mut mac = HmacSha256::new_from_slice(key)?;
                mac.update(message);
                Ok(mac.verify_slice(tag).is_ok())
            }
        }
    }
}

/// Canonical signing string for the sign path.
pub(crate) fn signing_input(payload: &Payload) -> Result<Cow<'_, str>, Error> {
    canonicalize(payload).map_err(|e| {
        sign_error(
            SignErrorKind::Encoding,
            &format!("Failed to serialize payload: {}", e),
        )
    })
}

/// Canonical signing string for the verify path.
pub(crate) fn verification_input(payload: &Payload) -> Result<Cow<'_, str>, Error> {
    canonicalize(payload).map_err(|e| {
        verification_error(
            VerificationErrorKind::InvalidPayload,
            &format!("Failed to serialize payload: {}", e),
        )
    })
}

pub(crate) fn sign_key_error(e: InvalidLength) -> Error {
    sign_error(
        SignErrorKind::InvalidSecret,
        &format!("Invalid HMAC key: {}", e),
    )
}

pub(crate) fn verify_key_error(e: InvalidLength) -> Error {
    verification_error(
        VerificationErrorKind::InvalidSecret,
        &format!("Invalid HMAC key: {}", e),
    )
}

/// Turn the outcome of [`HmacAlgorithm::matches`] into the verifier result.
pub(crate) fn ensure_match(matched: bool) -> Result<(), Error> {
    if matched {
        Ok(())
    } else {
        log::debug!("Rejected webhook signature: digest mismatch");
        Err(verification_error(
            VerificationErrorKind::InvalidSignature,
            "Signature does not match payload",
        ))
    }
}

/// Digests are emitted as lowercase hex, so anything else can never be a match.
pub(crate) fn is_lowercase_hex(digest: &str) -> bool {
    !digest.is_empty() && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_names_round_trip() {
        for algorithm in [HmacAlgorithm::Sha1, HmacAlgorithm::Sha256] {
            assert_eq!(HmacAlgorithm::from_name(algorithm.name()), Some(algorithm));
        }
        assert_eq!(HmacAlgorithm::from_name("md5"), None);
    }

    #[test]
    fn test_known_sha256_digest() {
        let tag = HmacAlgorithm::Sha256
            .digest(b"MY_VOICE_IS_MY_PASSPORT_VERIFY_ME", b"No more secrets, Marty.")
            .unwrap();
        assert_eq!(
            hex::encode(tag),
            "48ffd688c25ba6ccf90dbc7a6ad1147728f87aaa92a0e00bae1eb4550be2926f"
        );
    }

    #[test]
    fn test_is_lowercase_hex() {
        assert!(is_lowercase_hex("0123456789abcdef"));
        assert!(!is_lowercase_hex("0123456789ABCDEF"));
        assert!(!is_lowercase_hex(""));
        assert!(!is_lowercase_hex("abcg"));
    }

    #[test]
    fn test_matches_rejects_truncated_tag() {
        let key = b"secret";
        let tag = HmacAlgorithm::Sha1.digest(key, b"body").unwrap();
        assert!(HmacAlgorithm::Sha1.matches(key, b"body", &tag).unwrap());
        assert!(!HmacAlgorithm::Sha1
            .matches(key, b"body", &tag[..tag.len() - 1])
            .unwrap());
    }
}
