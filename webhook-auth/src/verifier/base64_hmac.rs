//! `base64Sha1` and `base64Sha256` verifiers (Svix and Clerk style).

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use super::{
    ensure_match, sign_key_error, signing_input, verification_input, verify_key_error,
    HmacAlgorithm,
};
use crate::canonical::Payload;
use crate::common::Verifier;
use crate::error::{
    sign_error, verification_error, Error, SignErrorKind, VerificationErrorKind,
};
use crate::registry::VerifierType;

/// Accepts unpadded input and ignores the unused bits of a trailing partial symbol.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// HMAC verifier keyed with a base64 secret and producing a bare base64 digest.
#[derive(Debug, Clone, Copy)]
pub struct Base64HmacVerifier {
    algorithm: HmacAlgorithm,
}

impl Base64HmacVerifier {
    pub fn new(algorithm: HmacAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn sha1() -> Self {
        Self::new(HmacAlgorithm::Sha1)
    }

    pub fn sha256() -> Self {
        Self::new(HmacAlgorithm::Sha256)
    }
}

/// Decode a provider secret into HMAC key bytes.
///
/// Standard and URL-safe alphabets may be mixed, padding and whitespace are ignored, and
/// a dangling final symbol that cannot complete a byte is dropped. Any other character
/// makes the secret invalid.
pub(crate) fn decode_secret(secret: &str) -> Result<Vec<u8>, String> {
    let mut normalized = String::with_capacity(secret.len());
    for c in secret.chars() {
        match c {
            '-' => normalized.push('+'),
            '_' => normalized.push('/'),
            c if c.is_ascii_alphanumeric() || c == '+' || c == '/' => normalized.push(c),
            c if c == '=' || c.is_ascii_whitespace() => {}
            other => return Err(format!("invalid base64 character {:?}", other)),
        }
    }

    if normalized.len() % 4 == 1 {
        normalized.pop();
    }

    SECRET_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| e.to_string())
}

impl Verifier for Base64HmacVerifier {
    fn sign(&self, payload: &Payload, secret: &str) -> Result<String, Error> {
        let key = decode_secret(secret).map_err(|e| {
            sign_error(
                SignErrorKind::InvalidSecret,
                &format!("Secret is not valid base64: {}", e),
            )
        })?;
        let message = signing_input(payload)?;
        let tag = self
            .algorithm
            .digest(&key, message.as_bytes())
            .map_err(sign_key_error)?;
        Ok(STANDARD.encode(tag))
    }

    fn verify(&self, payload: &Payload, secret: &str, signature: &str) -> Result<(), Error> {
        let key = decode_secret(secret).map_err(|e| {
            verification_error(
                VerificationErrorKind::InvalidSecret,
                &format!("Secret is not valid base64: {}", e),
            )
        })?;
        let provided = STANDARD.decode(signature).map_err(|e| {
            verification_error(
                VerificationErrorKind::MalformedSignature,
                &format!("Signature is not valid base64: {}", e),
            )
        })?;

        let message = verification_input(payload)?;
        let matched = self
            .algorithm
            .matches(&key, message.as_bytes(), &provided)
            .map_err(verify_key_error)?;
        ensure_match(matched)
    }

    fn verifier_type(&self) -> VerifierType {
        match self.algorithm {
            HmacAlgorithm::Sha1 => VerifierType::Base64Sha1,
            HmacAlgorithm::Sha256 => VerifierType::Base64Sha256,
        }
    }
}
