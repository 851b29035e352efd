//! `jsonWebToken` verifier: the signature is an HS256 JWT whose claims carry the payload.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::warn;
use serde_json::{Map, Value};

use crate::canonical::Payload;
use crate::common::Verifier;
use crate::error::{
    sign_error, verification_error, Error, SignErrorKind, VerificationErrorKind,
};
use crate::registry::VerifierType;

/// Claim that holds a non-object payload.
pub const PAYLOAD_CLAIM: &str = "payload";

const ISSUER_CLAIM: &str = "iss";

/// Verification depends only on the token: its HMAC, its registered time claims and,
/// when configured, its issuer. The request body is not compared against the claims.
#[derive(Debug, Clone, Default)]
pub struct JwtVerifier {
    issuer: Option<String>,
}

impl JwtVerifier {
    pub fn new(issuer: Option<String>) -> Self {
        Self { issuer }
    }

    /// Object payloads become the claim set. Anything else is wrapped under
    /// [`PAYLOAD_CLAIM`], which is refused when an issuer claim has to be attached.
    fn claims(&self, payload: &Payload) -> Result<Map<String, Value>, Error> {
        let mut claims = match payload {
            Payload::Json(Value::Object(map)) => map.clone(),
            _ if self.issuer.is_some() => {
                return Err(sign_error(
                    SignErrorKind::InvalidPayload,
                    "Payload must be a JSON object to carry an issuer claim",
                ));
            }
            Payload::Text(text) => {
                let mut map = Map::new();
                map.insert(PAYLOAD_CLAIM.to_string(), Value::String(text.clone()));
                map
            }
            Payload::Json(value) => {
                let mut map = Map::new();
                map.insert(PAYLOAD_CLAIM.to_string(), value.clone());
                map
            }
        };

        if let Some(issuer) = &self.issuer {
            claims.insert(ISSUER_CLAIM.to_string(), Value::String(issuer.clone()));
        }

        Ok(claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            validation
                .required_spec_claims
                .insert(ISSUER_CLAIM.to_string());
        }
        validation
    }
}

impl Verifier for JwtVerifier {
    fn sign(&self, payload: &Payload, secret: &str) -> Result<String, Error> {
        let claims = self.claims(payload)?;
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| {
            sign_error(
                SignErrorKind::Encoding,
                &format!("Failed to sign JWT: {}", e),
            )
        })
    }

    fn verify(&self, payload: &Payload, secret: &str, signature: &str) -> Result<(), Error> {
        if payload.is_empty() {
            warn!("Verifying a JWT webhook signature with an empty payload");
        }

        decode::<Map<String, Value>>(
            signature,
            &DecodingKey::from_secret(secret.as_bytes()),
            &self.validation(),
        )
        .map(|_| ())
        .map_err(|e| {
            log::debug!("Rejected webhook JWT: {}", e);
            verification_error(
                VerificationErrorKind::InvalidToken,
                &format!("JWT verification failed: {}", e),
            )
        })
    }

    fn verifier_type(&self) -> VerifierType {
        VerifierType::JsonWebToken
    }
}
