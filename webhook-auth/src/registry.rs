//! The verifier registry: a closed set of verifier names and the single construction point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canonical::Payload;
use crate::common::{Verifier, VerifyOptions};
use crate::error::Error;
use crate::verifier::{
    Base64HmacVerifier, HmacHexVerifier, JwtVerifier, SecretKeyVerifier, SkipVerifier,
    TimestampSchemeVerifier,
};

/// Every verifier the registry can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerifierType {
    SecretKey,
    Sha1,
    Sha256,
    Base64Sha1,
    Base64Sha256,
    TimestampScheme,
    JsonWebToken,
    None,
    Skip,
}

impl VerifierType {
    pub const ALL: [VerifierType; 9] = [
        VerifierType::SecretKey,
        VerifierType::Sha1,
        VerifierType::Sha256,
        VerifierType::Base64Sha1,
        VerifierType::Base64Sha256,
        VerifierType::TimestampScheme,
        VerifierType::JsonWebToken,
        VerifierType::None,
        VerifierType::Skip,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VerifierType::SecretKey => "secretKey",
            VerifierType::Sha1 => "sha1",
            VerifierType::Sha256 => "sha256",
            VerifierType::Base64Sha1 => "base64Sha1",
            VerifierType::Base64Sha256 => "base64Sha256",
            VerifierType::TimestampScheme => "timestampScheme",
            VerifierType::JsonWebToken => "jsonWebToken",
            VerifierType::None => "none",
            VerifierType::Skip => "skip",
        }
    }

    /// True for `none` and `skip`.
    pub fn is_degenerate(self) -> bool {
        matches!(self, VerifierType::None | VerifierType::Skip)
    }
}

/// Returned when a verifier name is not in the registry.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseVerifierTypeError(pub String);

impl fmt::Display for ParseVerifierTypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown verifier type: {}", self.0)
    }
}

impl std::error::Error for ParseVerifierTypeError {}

impl FromStr for VerifierType {
    type Err = ParseVerifierTypeError;
    fn from_str(name: &str) -> Result<VerifierType, Self::Err> {
        VerifierType::ALL
            .into_iter()
            .find(|verifier_type| verifier_type.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseVerifierTypeError(name.to_string()))
    }
}

impl fmt::Display for VerifierType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build a verifier of the given type.
///
/// Options that do not apply to the chosen verifier are ignored.
pub fn create_verifier(
    verifier_type: VerifierType,
    options: Option<VerifyOptions>,
) -> Box<dyn Verifier> {
    let options = options.unwrap_or_default();
    match verifier_type {
        VerifierType::SecretKey => Box::new(SecretKeyVerifier),
        VerifierType::Sha1 => Box::new(HmacHexVerifier::sha1()),
        VerifierType::Sha256 => Box::new(HmacHexVerifier::sha256()),
        VerifierType::Base64Sha1 => Box::new(Base64HmacVerifier::sha1()),
        VerifierType::Base64Sha256 => Box::new(Base64HmacVerifier::sha256()),
        VerifierType::TimestampScheme => Box::new(TimestampSchemeVerifier::new(options)),
        VerifierType::JsonWebToken => Box::new(JwtVerifier::new(options.issuer)),
        VerifierType::None | VerifierType::Skip => Box::new(SkipVerifier::new(verifier_type)),
    }
}

/// Sign a payload, falling back to `options.default_secret` when `secret` is `None`.
pub fn sign_payload(
    verifier_type: VerifierType,
    payload: &Payload,
    secret: Option<&str>,
    options: Option<VerifyOptions>,
) -> Result<String, Error> {
    let options = options.unwrap_or_default();
    let secret = options.resolve_secret(secret);
    create_verifier(verifier_type, Some(options)).sign(payload, &secret)
}

/// Verify a signature, falling back to `options.default_secret` when `secret` is `None`.
pub fn verify_signature(
    verifier_type: VerifierType,
    payload: &Payload,
    secret: Option<&str>,
    signature: &str,
    options: Option<VerifyOptions>,
) -> Result<(), Error> {
    let options = options.unwrap_or_default();
    let secret = options.resolve_secret(secret);
    create_verifier(verifier_type, Some(options)).verify(payload, &secret, signature)
}
