//! Ready-made signature transformers for common provider header formats.

use std::sync::Arc;

use crate::common::SignatureTransformer;

/// Pick one entry out of a space-separated list of `version,signature` pairs, as sent by
/// Svix and Clerk (`v1,abc= v1,def=`). The first entry with a matching version wins;
/// when none matches the result is empty and verification fails.
pub fn versioned_signature(version: &str) -> SignatureTransformer {
    let version = version.to_string();
    Arc::new(move |header: &str| {
        header
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .find(|(entry_version, _)| *entry_version == version)
            .map(|(_, signature)| signature.to_string())
            .unwrap_or_default()
    })
}

/// Remove a fixed prefix such as `sha256=` when the provider adds one the verifier
/// does not expect. Values without the prefix pass through unchanged.
pub fn strip_prefix(prefix: &str) -> SignatureTransformer {
    let prefix = prefix.to_string();
    Arc::new(move |header: &str| {
        header
            .strip_prefix(prefix.as_str())
            .unwrap_or(header)
            .to_string()
    })
}
