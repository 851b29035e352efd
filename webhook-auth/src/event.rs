//! Event adapter: verify an inbound webhook request as delivered by the transport.

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::canonical::Payload;
use crate::common::VerifyOptions;
use crate::error::{verification_error, Error, VerificationErrorKind};
use crate::registry::{create_verifier, VerifierType};

/// An inbound webhook request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Request headers keyed by lowercase name. When names differ only by case the
    /// last one delivered wins.
    #[serde(default, deserialize_with = "lowercase_headers")]
    pub headers: HashMap<String, String>,
    /// Raw body, base64 encoded when `is_base64_encoded` is set.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.is_base64_encoded = false;
        self
    }

    /// Store `body` base64 encoded, the way some gateways deliver binary-safe bodies.
    pub fn with_base64_body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.body = STANDARD.encode(body);
        self.is_base64_encoded = true;
        self
    }

    /// Case-insensitive header lookup.
    ///
    /// `headers` is public, so a map filled in directly may still hold mixed-case names;
    /// among those the lexicographically smallest name is used.
    pub fn header(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.headers.get(&name.to_ascii_lowercase()) {
            return Some(value.as_str());
        }
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, value)| value.as_str())
    }

    /// The body as text, decoding it first when it is base64 encoded.
    pub fn decoded_body(&self) -> Result<String, Error> {
        if !self.is_base64_encoded {
            return Ok(self.body.clone());
        }

        let bytes = STANDARD.decode(&self.body).map_err(|e| {
            verification_error(
                VerificationErrorKind::InvalidPayload,
                &format!("Event body is not valid base64: {}", e),
            )
        })?;
        String::from_utf8(bytes).map_err(|e| {
            verification_error(
                VerificationErrorKind::InvalidPayload,
                &format!("Event body is not valid UTF-8: {}", e),
            )
        })
    }
}

fn lowercase_headers<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct HeaderVisitor;

    impl<'de> Visitor<'de> for HeaderVisitor {
        type Value = HashMap<String, String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of header names to values")
        }

        fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut headers = HashMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, value)) = access.next_entry::<String, String>()? {
                headers.insert(name.to_ascii_lowercase(), value);
            }
            Ok(headers)
        }
    }

    deserializer.deserialize_map(HeaderVisitor)
}

/// Verify an event's signature.
///
/// 1. The body comes from `payload` when given, otherwise from the (decoded) event body.
/// 2. The signature is read from `options.signature_header()` and passed through the
///    signature transformer. A missing header verifies as an empty signature.
/// 3. When `options.event_timestamp` is set it must fall within the tolerance window,
///    independently of any timestamp inside the signature.
/// 4. The verifier built from `verifier_type` and `options` makes the final decision.
pub fn verify_event(
    verifier_type: VerifierType,
    event: &Event,
    payload: Option<&Payload>,
    secret: Option<&str>,
    options: Option<VerifyOptions>,
) -> Result<(), Error> {
    let options = options.unwrap_or_default();

    let body = match payload {
        Some(payload) => payload.clone(),
        None => Payload::Text(event.decoded_body()?),
    };

    let signature = match event.header(options.signature_header()) {
        Some(raw) => options.transform_signature(raw),
        None => {
            debug!(
                "Webhook event has no {} header",
                options.signature_header()
            );
            String::new()
        }
    };

    if let Some(event_timestamp) = options.event_timestamp {
        if !options.is_within_tolerance(event_timestamp) {
            return Err(verification_error(
                VerificationErrorKind::TimestampExpired,
                "Event timestamp is outside the tolerance window",
            ));
        }
    }

    let secret = options.resolve_secret(secret);
    create_verifier(verifier_type, Some(options)).verify(&body, &secret, &signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DEFAULT_SIGNATURE_HEADER;
    use crate::error::ErrorKind;
    use crate::registry::sign_payload;
    use crate::transformers::versioned_signature;

    const SECRET: &str = "MY_VOICE_IS_MY_PASSPORT_VERIFY_ME";
    const BODY: &str = r#"{"data":{"id":"user_1"},"type":"user.created"}"#;
    const NOW: i64 = 1_646_004_463_000;

    fn sign(verifier_type: VerifierType, body: &str) -> String {
        sign_payload(verifier_type, &body.into(), Some(SECRET), None).unwrap()
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let event = Event::new().with_header("x-webhook-signature", "abc");
        assert_eq!(event.header(DEFAULT_SIGNATURE_HEADER), Some("abc"));
        assert_eq!(event.header("X-WEBHOOK-SIGNATURE"), Some("abc"));
        assert_eq!(event.header("x-other"), None);
    }

    #[test]
    fn test_header_names_differing_by_case_resolve_deterministically() {
        let event = Event::new()
            .with_header("X-Webhook-Signature", "first")
            .with_header("x-webhook-signature", "second");
        assert_eq!(event.headers.len(), 1);
        assert_eq!(event.header(DEFAULT_SIGNATURE_HEADER), Some("second"));

        let event: Event = serde_json::from_str(
            r#"{"headers":{"X-Webhook-Signature":"first","x-webhook-signature":"second"}}"#,
        )
        .unwrap();
        assert_eq!(event.headers.len(), 1);
        assert_eq!(event.header(DEFAULT_SIGNATURE_HEADER), Some("second"));

        let mut event = Event::new();
        event.headers.insert("X-Webhook-Signature".into(), "upper".into());
        event.headers.insert("X-webhook-signature".into(), "mixed".into());
        for _ in 0..8 {
            assert_eq!(event.header(DEFAULT_SIGNATURE_HEADER), Some("upper"));
        }
    }

    #[test]
    fn test_plain_event_verifies() {
        let event = Event::new()
            .with_body(BODY)
            .with_header("X-Webhook-Signature", sign(VerifierType::Sha256, BODY));
        assert!(verify_event(VerifierType::Sha256, &event, None, Some(SECRET), None).is_ok());
    }

    #[test]
    fn test_base64_body_verifies_like_plain_body() {
        let signature = sign(VerifierType::Sha1, BODY);
        let plain = Event::new()
            .with_body(BODY)
            .with_header(DEFAULT_SIGNATURE_HEADER, signature.clone());
        let encoded = Event::new()
            .with_base64_body(BODY)
            .with_header(DEFAULT_SIGNATURE_HEADER, signature);

        assert!(encoded.is_base64_encoded);
        assert!(verify_event(VerifierType::Sha1, &plain, None, Some(SECRET), None).is_ok());
        assert!(verify_event(VerifierType::Sha1, &encoded, None, Some(SECRET), None).is_ok());
    }

    #[test]
    fn test_invalid_base64_body_is_rejected() {
        let mut event = Event::new().with_header(DEFAULT_SIGNATURE_HEADER, "sha1=00");
        event.body = "%%%".to_string();
        event.is_base64_encoded = true;
        let err = verify_event(VerifierType::Sha1, &event, None, Some(SECRET), None).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Verification(VerificationErrorKind::InvalidPayload)
        );
    }

    #[test]
    fn test_explicit_payload_overrides_event_body() {
        let event = Event::new()
            .with_body("something the gateway rewrote")
            .with_header(DEFAULT_SIGNATURE_HEADER, sign(VerifierType::Sha256, BODY));
        let payload = Payload::from(BODY);
        assert!(
            verify_event(VerifierType::Sha256, &event, Some(&payload), Some(SECRET), None).is_ok()
        );
    }

    #[test]
    fn test_custom_signature_header() {
        let event = Event::new()
            .with_body(BODY)
            .with_header("x-hub-signature-256", sign(VerifierType::Sha256, BODY));
        let options = VerifyOptions::new().with_signature_header("X-Hub-Signature-256");
        assert!(
            verify_event(VerifierType::Sha256, &event, None, Some(SECRET), Some(options)).is_ok()
        );
    }

    #[test]
    fn test_missing_header_is_rejected_by_real_verifiers() {
        let event = Event::new().with_body(BODY);
        assert!(verify_event(VerifierType::Sha256, &event, None, Some(SECRET), None).is_err());
        assert!(verify_event(VerifierType::Skip, &event, None, Some(SECRET), None).is_ok());
    }

    #[test]
    fn test_signature_transformer_picks_v1_entry() {
        let signed_content = format!("msg_25hz5cPxRz5ilWSQSiYfgxpYHTH.1646004463.{}", BODY);
        let signature = sign(VerifierType::Base64Sha256, &signed_content);
        let event = Event::new().with_body(BODY).with_header(
            "svix-signature",
            format!("v0,bm90IGl0 v1,{} v2,c29tZXRoaW5nIGVsc2U=", signature),
        );
        let options = VerifyOptions {
            signature_header: Some("svix-signature".to_string()),
            signature_transformer: Some(versioned_signature("v1")),
            ..VerifyOptions::default()
        };

        assert!(verify_event(
            VerifierType::Base64Sha256,
            &event,
            Some(&Payload::from(signed_content)),
            Some(SECRET),
            Some(options)
        )
        .is_ok());
    }

    #[test]
    fn test_event_timestamp_outside_tolerance_is_rejected() {
        let event = Event::new()
            .with_body(BODY)
            .with_header(DEFAULT_SIGNATURE_HEADER, sign(VerifierType::Sha256, BODY));

        let fresh = VerifyOptions::new()
            .with_current_timestamp_override(NOW)
            .with_event_timestamp(NOW - 60_000);
        assert!(verify_event(VerifierType::Sha256, &event, None, Some(SECRET), Some(fresh)).is_ok());

        let stale = VerifyOptions::new()
            .with_current_timestamp_override(NOW)
            .with_event_timestamp(NOW - 10 * 60_000);
        let err = verify_event(VerifierType::Sha256, &event, None, Some(SECRET), Some(stale))
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Verification(VerificationErrorKind::TimestampExpired)
        );
    }

    #[test]
    fn test_timestamp_scheme_through_event() {
        let options = VerifyOptions::new().with_current_timestamp_override(NOW);
        let signature = sign_payload(
            VerifierType::TimestampScheme,
            &BODY.into(),
            Some(SECRET),
            Some(options.clone()),
        )
        .unwrap();
        let event = Event::new()
            .with_body(BODY)
            .with_header(DEFAULT_SIGNATURE_HEADER, signature);

        assert!(verify_event(
            VerifierType::TimestampScheme,
            &event,
            None,
            Some(SECRET),
            Some(options)
        )
        .is_ok());
    }

    #[test]
    fn test_event_deserializes_from_gateway_json() {
        let event: Event = serde_json::from_str(
            r#"{"headers":{"X-Webhook-Signature":"sig"},"body":"eyJhIjoxfQ==","isBase64Encoded":true}"#,
        )
        .unwrap();
        assert_eq!(event.decoded_body().unwrap(), r#"{"a":1}"#);
        assert_eq!(event.header("x-webhook-signature"), Some("sig"));
    }
}
