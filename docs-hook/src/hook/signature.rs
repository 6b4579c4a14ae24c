//! Webhook signature primitives.
//!
//! HMAC digests are checked with [`Mac::verify_slice`]; plain tokens go
//! through [`constant_time_compare`].

use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `message` keyed with `secret`.
pub fn hmac_sha256(secret: &str, message: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Vec::new(),
    };
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// GitHub-style header value: `sha256=` followed by the hex digest of the body.
pub fn github_signature(secret: &str, body: &[u8]) -> String {
    format!("sha256={}", hex::encode(hmac_sha256(secret, body)))
}

/// Gitee-style token: base64 of HMAC-SHA256 over `"{timestamp}\n{secret}"`.
pub fn gitee_signature(secret: &str, timestamp: &str) -> String {
    let payload = format!("{}\n{}", timestamp, secret);
    base64::engine::general_purpose::STANDARD.encode(hmac_sha256(secret, payload.as_bytes()))
}

fn keyed_mac(secret: &str) -> Option<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes()).ok()
}

/// Check a GitHub `sha256=<hex>` header against the raw body.
pub fn verify_github_signature(secret: &str, body: &[u8], header: &str) -> bool {
    let Some(hex_sig) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let Some(mut mac) = keyed_mac(secret) else {
        return false;
    };

    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Check a Gitee base64 token against the asserted timestamp.
pub fn verify_gitee_signature(secret: &str, timestamp: &str, token: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(token) else {
        return false;
    };
    let Some(mut mac) = keyed_mac(secret) else {
        return false;
    };

    mac.update(format!("{}\n{}", timestamp, secret).as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Constant-time string comparison to prevent timing attacks.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
