//! Logon authentication: nonce + SHA-256 digest + Base64.
//!
//! Not HMAC — the password field is a plain digest over the concatenated
//! raw data and shared secret, no keyed MAC involved.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Builds the Logon raw-data string: `<ms-epoch>.<base64(64 random bytes)>`.
/// The nonce bytes come from the OS CSPRNG — never swap in a deterministic
/// source, even for tests.
pub fn logon_raw_data(now_ms: u64) -> String {
    let mut nonce = [0u8; 64];
    OsRng.fill_bytes(&mut nonce);
    format!("{now_ms}.{}", BASE64.encode(nonce))
}

/// Password field: `Base64(SHA-256(raw_data ++ secret))`.
pub fn logon_password(raw_data: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_data.as_bytes());
    hasher.update(secret.as_bytes());
    BASE64.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_deterministic_for_fixed_inputs() {
        let raw = "1700000000000.AAAA";
        let a = logon_password(raw, "secret");
        let b = logon_password(raw, "secret");
        assert_eq!(a, b);
    }

    #[test]
    fn password_changes_with_secret() {
        let raw = "1700000000000.AAAA";
        assert_ne!(logon_password(raw, "s1"), logon_password(raw, "s2"));
    }

    #[test]
    fn raw_data_embeds_timestamp_and_is_not_reused() {
        let a = logon_raw_data(1_700_000_000_000);
        let b = logon_raw_data(1_700_000_000_000);
        assert!(a.starts_with("1700000000000."));
        assert_ne!(a, b, "nonce must differ across calls");
    }
}
