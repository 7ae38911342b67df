//! GitHub webhook signature validation.
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw request body and
//! sends the hex digest in `X-Hub-Signature-256` as `sha256=<hex>`.
//! See <https://docs.github.com/webhooks/using-webhooks/validating-webhook-deliveries>.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Check a delivery's signature header against the shared secret.
///
/// Returns `false` for a missing or malformed header; the comparison itself
/// is constant-time via [`Mac::verify_slice`].
pub fn validate_signature(secret: &str, signature_header: Option<&str>, body: &[u8]) -> bool {
    let Some(hex_digest) = signature_header.and_then(|header| header.strip_prefix("sha256=")) else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Hex signature header value for `body`, as GitHub would send it.
/// Used by tests and useful for local delivery replay.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
