//! Webhook signature verification.
//!
//! The payment provider signs each delivery with HMAC-SHA256 over
//! `"{timestamp}.{raw body}"` using a shared secret, sent as
//! `Pay-Signature: t=<unix seconds>,v1=<hex digest>`. A delivery may carry
//! several `v1` values during secret rotation; any match accepts.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Errors produced by signature verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The header is not in `t=...,v1=...` form.
    #[error("malformed signature header")]
    Malformed,

    /// The signed timestamp is outside the accepted window.
    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,

    /// No signature in the header matches the payload.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a signature header against the raw request body.
///
/// `tolerance_secs` bounds how far the signed timestamp may drift from
/// `now_unix` in either direction, which limits replay of captured
/// deliveries.
///
/// # Errors
///
/// Returns a `SignatureError` describing why verification failed. Callers
/// must not apply any side effect on failure.
pub fn verify_signature(
    secret: &str,
    header: &str,
    body: &str,
    now_unix: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(ts)) => timestamp = ts.parse().ok(),
            (Some("v1"), Some(sig)) => signatures.push(sig),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }

    if (now_unix - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::StaleTimestamp);
    }

    let expected = hmac_sha256_hex(secret, &format!("{timestamp}.{body}"));

    if signatures.iter().any(|sig| constant_time_eq(&expected, sig)) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Compute HMAC-SHA256 and return the hex-encoded digest (64 characters).
///
/// # Panics
///
/// Never panics in practice: HMAC-SHA256 accepts keys of any size per
/// RFC 2104, so `new_from_slice` only fails if the implementation is
/// broken.
#[must_use]
pub fn hmac_sha256_hex(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts any key size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison for signature digests.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
