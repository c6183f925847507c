//! Webhook signature construction.
//!
//! Signatures are HMAC-SHA256 digests over the dot-joined signing string
//! `"{timestamp}.{nonce}.{payload-json}"`. The payload is serialized exactly
//! once, in the key order the caller supplied; the verifying endpoint must
//! reproduce the digest bit-for-bit from the three transmitted values plus
//! the shared secret. Freshness and replay checks belong to the receiver,
//! not to this module.

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use tracing::debug;

use crate::error::{ApiError, Result};

/// Signature triple attached to outbound requests as
/// `x-webhook-timestamp` / `x-webhook-nonce` / `x-webhook-signature`
#[derive(Debug, Clone)]
pub struct SignatureInfo {
    /// Unix seconds at signing time
    pub timestamp: i64,
    /// 32 lowercase hex chars (16 random bytes)
    pub nonce: String,
    /// Hex-encoded HMAC-SHA256 digest
    pub signature: String,
}

/// Current Unix time in whole seconds
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Fresh 128-bit nonce from the OS CSPRNG, rendered as 32 hex chars
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compute the HMAC-SHA256 signature for a payload.
///
/// The secret is used as the raw HMAC key. Deterministic in
/// `(timestamp, nonce, payload, secret)`.
pub fn sign(
    timestamp: i64,
    nonce: &str,
    payload: &serde_json::Value,
    secret: &str,
) -> Result<String> {
    let payload_json = serde_json::to_string(payload)?;
    let signing_string = format!("{}.{}.{}", timestamp, nonce, payload_json);

    // Diagnostic only; the secret is redacted and verification never
    // depends on this having run.
    debug!(
        timestamp,
        nonce,
        payload = %payload_json,
        secret_prefix = %redact(secret),
        "computing webhook signature"
    );

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::Internal(format!("Invalid HMAC secret: {}", e)))?;

    mac.update(signing_string.as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(hex::encode(digest))
}

/// Sign a payload with a freshly generated timestamp and nonce.
///
/// Two calls with an identical payload produce distinct nonces and, in the
/// common case, distinct signatures. That is deliberate replay resistance,
/// not nondeterminism.
pub fn signature_info(payload: &serde_json::Value, secret: &str) -> Result<SignatureInfo> {
    let timestamp = unix_timestamp();
    let nonce = generate_nonce();
    let signature = sign(timestamp, &nonce, payload, secret)?;

    Ok(SignatureInfo {
        timestamp,
        nonce,
        signature,
    })
}

/// First 10 characters of the secret, for debug logging
fn redact(secret: &str) -> String {
    secret.chars().take(10).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TS: i64 = 1_700_000_000;
    const NONCE: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn sign_matches_known_vector() {
        // Independently computed: HMAC-SHA256("s3cr3t",
        //   "1700000000.0123456789abcdef0123456789abcdef.{\"documentId\":\"DOC-1\"}")
        let payload = json!({"documentId": "DOC-1"});
        let sig = sign(TS, NONCE, &payload, "s3cr3t").unwrap();
        assert_eq!(
            sig,
            "4cd23726e7514f83174c9359a19fdb11efdc329925655eaf9105c5d3671d196b"
        );
    }

    #[test]
    fn sign_matches_known_vector_full_payload() {
        let payload = json!({
            "webhookId": "wh123",
            "documentId": "DOC-1",
            "decision": "approve",
            "approver": {"id": "u1", "name": "张三", "email": "z@x.com"},
            "timestamp": TS,
        });
        let sig = sign(TS, NONCE, &payload, "s3cr3t").unwrap();
        assert_eq!(
            sig,
            "5bf51e7e36541e00484ad18526f19d57280409f4dd1d71dec9f65171b6455775"
        );
    }

    #[test]
    fn sign_is_deterministic() {
        let payload = json!({"documentId": "DOC-1"});
        let a = sign(TS, NONCE, &payload, "s3cr3t").unwrap();
        let b = sign(TS, NONCE, &payload, "s3cr3t").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn changing_any_component_changes_signature() {
        let payload = json!({"documentId": "DOC-1"});
        let base = sign(TS, NONCE, &payload, "s3cr3t").unwrap();

        assert_ne!(base, sign(TS + 1, NONCE, &payload, "s3cr3t").unwrap());
        assert_ne!(
            base,
            sign(TS, "ffffffffffffffffffffffffffffffff", &payload, "s3cr3t").unwrap()
        );
        assert_ne!(
            base,
            sign(TS, NONCE, &json!({"documentId": "DOC-2"}), "s3cr3t").unwrap()
        );
        assert_ne!(base, sign(TS, NONCE, &payload, "other").unwrap());
        // Different secret, known vector
        assert_eq!(
            sign(TS, NONCE, &payload, "other").unwrap(),
            "b6222039fbb09f96a7ac48a6284bd4539dbbd83c76d38df2781bb5cfc5fc27e3"
        );
    }

    #[test]
    fn payload_key_order_is_significant() {
        // No canonical re-ordering is performed: the caller's key order is
        // the signed order.
        let ab = json!({"a": 1, "b": 2});
        let ba = json!({"b": 2, "a": 1});
        assert_ne!(
            sign(TS, NONCE, &ab, "s3cr3t").unwrap(),
            sign(TS, NONCE, &ba, "s3cr3t").unwrap()
        );
    }

    #[test]
    fn nonce_is_32_lowercase_hex_chars() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signature_info_is_fresh_per_call() {
        let payload = json!({"documentId": "DOC-1"});
        let a = signature_info(&payload, "s3cr3t").unwrap();
        let b = signature_info(&payload, "s3cr3t").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.signature, b.signature);
    }
}
