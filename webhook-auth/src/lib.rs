//! # webhook-auth
//!
//! Webhook signature signing and verification:
//! - Payload canonicalization shared by every HMAC-based scheme
//! - Verifiers: `secretKey`, `sha1`, `sha256`, `base64Sha1`, `base64Sha256`,
//!   `timestampScheme`, `jsonWebToken`, and the `none`/`skip` escape hatches
//! - A registry that builds a verifier from its name
//! - An event adapter that pulls the body and signature out of an inbound request
//!
//! ## Usage
//!
//! ```rust
//! use webhook_auth::{sign_payload, verify_event, Event, Payload, VerifierType};
//!
//! let body = r#"{"type":"user.created"}"#;
//! let signature =
//!     sign_payload(VerifierType::Sha256, &Payload::from(body), Some("secret"), None).unwrap();
//!
//! let event = Event::new()
//!     .with_body(body)
//!     .with_header("x-webhook-signature", signature);
//! assert!(verify_event(VerifierType::Sha256, &event, None, Some("secret"), None).is_ok());
//! ```

pub mod canonical;
pub mod common;
pub mod error;
pub mod event;
pub mod registry;
pub mod transformers;
pub mod verifier;


// Re-export commonly used types
pub use canonical::Payload;
pub use common::{
    SignatureTransformer, Verifier, VerifyOptions, DEFAULT_SIGNATURE_HEADER, DEFAULT_TOLERANCE,
};
pub use error::{Error, ErrorKind};
pub use event::{verify_event, Event};
pub use registry::{create_verifier, sign_payload, verify_signature, VerifierType};
