use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password with Argon2id and a fresh random salt.
///
/// Runs a memory-hard KDF; callers on the async path should wrap this in
/// `spawn_blocking`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            AppError::PasswordHash
        })
}

/// Verify a password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

// =============================================================================
// Session Tokens
// =============================================================================
//
// Opaque bearer tokens of the form `user_id.expires.signature` where the
// signature is hex(HMAC-SHA256(secret, "user_id.expires")). The user id is a
// UUID, so '.' never appears in it and the format splits unambiguously.

/// Issue a session token for `user_id` valid for `ttl_secs` from `now`
pub fn issue_token(user_id: &str, secret: &str, now_secs: i64, ttl_secs: i64) -> String {
    let expires = now_secs + ttl_secs;
    let payload = format!("{}.{}", user_id, expires);
    let signature = hmac_hex(&payload, secret);
    format!("{}.{}", payload, signature)
}

/// Verify a session token, returning the user id it was issued for
pub fn verify_token(token: &str, secret: &str, now_secs: i64) -> Option<String> {
    let mut parts = token.splitn(3, '.');
    let user_id = parts.next()?;
    let expires_str = parts.next()?;
    let signature = parts.next()?;

    let payload = format!("{}.{}", user_id, expires_str);
    if !verify_hmac(&payload, signature, secret) {
        tracing::warn!("Session token signature mismatch");
        return None;
    }

    let expires: i64 = expires_str.parse().ok()?;
    if now_secs >= expires {
        tracing::debug!("Session token expired");
        return None;
    }

    Some(user_id.to_string())
}

// =============================================================================
// HMAC Signatures
// =============================================================================

/// hex(HMAC-SHA256(secret, data))
pub fn hmac_hex(data: &str, secret: &str) -> String {
    // HMAC-SHA256 accepts keys of any length, so this cannot fail in
    // practice; an empty signature is returned rather than panicking
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return String::new();
        }
    };
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex-encoded HMAC-SHA256 signature
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Verify a payment gateway capture signature.
///
/// The gateway signs `"{order_id}|{payment_id}"` with the key secret.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    let signed = format!("{}|{}", order_id, payment_id);
    verify_hmac(&signed, signature, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    // =========================================================================
    // Password Hashing Tests
    // =========================================================================

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let h1 = hash_password("same-password").unwrap();
        let h2 = hash_password("same-password").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_verify_against_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    // =========================================================================
    // Session Token Tests
    // =========================================================================

    #[test]
    fn test_token_round_trip() {
        let user_id = "b7e0a1c2-0000-4000-8000-000000000001";
        let token = issue_token(user_id, SECRET, 1_000_000, 3600);

        let verified = verify_token(&token, SECRET, 1_000_100);
        assert_eq!(verified.as_deref(), Some(user_id));
    }

    #[test]
    fn test_token_expiry() {
        let token = issue_token("user-1", SECRET, 1_000_000, 3600);

        // One second past expiry
        assert!(verify_token(&token, SECRET, 1_003_601).is_none());
        // Exactly at expiry is also rejected
        assert!(verify_token(&token, SECRET, 1_003_600).is_none());
    }

    #[test]
    fn test_token_tamper_rejected() {
        let token = issue_token("user-1", SECRET, 1_000_000, 3600);

        // Swap the user id but keep the signature
        let forged = token.replacen("user-1", "user-2", 1);
        assert!(verify_token(&forged, SECRET, 1_000_100).is_none());

        // Wrong secret
        assert!(verify_token(&token, "other-secret", 1_000_100).is_none());

        // Not even token-shaped
        assert!(verify_token("garbage", SECRET, 1_000_100).is_none());
        assert!(verify_token("", SECRET, 1_000_100).is_none());
    }

    // =========================================================================
    // HMAC / Payment Signature Tests
    // =========================================================================

    #[test]
    fn test_hmac_round_trip() {
        let sig = hmac_hex("payload", SECRET);
        assert!(verify_hmac("payload", &sig, SECRET));
        assert!(!verify_hmac("payload2", &sig, SECRET));
        assert!(!verify_hmac("payload", &sig, "other"));
    }

    #[test]
    fn test_verify_hmac_rejects_non_hex() {
        assert!(!verify_hmac("payload", "zzzz-not-hex", SECRET));
        assert!(!verify_hmac("payload", "", SECRET));
    }

    #[test]
    fn test_payment_signature() {
        let sig = hmac_hex("order_1|pay_1", SECRET);
        assert!(verify_payment_signature("order_1", "pay_1", &sig, SECRET));
        assert!(!verify_payment_signature("order_1", "pay_2", &sig, SECRET));
        assert!(!verify_payment_signature("order_2", "pay_1", &sig, SECRET));
    }
}
