//! Webhook signature verification.
//!
//! Paystack signs the raw request body with HMAC-SHA512 keyed by the secret
//! key and sends the lowercase hex digest in `x-paystack-signature`.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Check `signature` against the HMAC-SHA512 of `body` under `secret`.
///
/// Returns `false` for an empty secret, a signature that is not hex, or a
/// digest mismatch. The comparison is constant time.
pub(super) fn verify_hmac_sha512(secret: &[u8], signature: &str, body: &[u8]) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
