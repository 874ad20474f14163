//! HMAC-SHA256 webhook signatures.

use hmac::digest::InvalidLength;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Primary signature header.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Header consulted when the primary one is absent or empty.
pub const FALLBACK_SIGNATURE_HEADER: &str = "x-hub-signature-256";

fn keyed(secret: &str, payload: &[u8]) -> Result<HmacSha256, InvalidLength> {
    let mut mac = <HmacSha256 as KeyInit>::new_from_slice(secret.as_bytes())?;
    mac.update(payload);
    Ok(mac)
}

/// Signs a payload with HMAC-SHA256 and returns the lowercase hex digest.
///
/// # Errors
///
/// Returns [`InvalidLength`] if the key is rejected.
pub fn sign_payload(secret: &str, payload: &[u8]) -> Result<String, InvalidLength> {
    Ok(hex::encode(keyed(secret, payload)?.finalize().into_bytes()))
}

/// Checks a hex `signature` against the payload in constant time.
///
/// An empty `secret` disables verification and always returns true.
#[must_use]
pub fn validate_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    if secret.is_empty() {
        return true;
    }
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    keyed(secret, payload).is_ok_and(|mac| mac.verify_slice(&expected).is_ok())
}
