use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

/// Random reset/verification secret. The raw value is sent to the user
/// exactly once; only its digest (see [`hash_secret`]) is persisted.
pub fn generate_opaque_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Deterministic one-way digest used to look the secret up again. A fast
/// hash is fine here: the input has 256 bits of entropy, unlike passwords.
pub fn hash_secret(plain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plain.as_bytes());
    Base64UrlUnpadded::encode_string(&hasher.finalize())
}

/// 6-digit numeric OTP, stored with the adaptive hash since the value space
/// is small enough to brute-force offline.
pub fn generate_numeric_otp() -> String {
    let otp: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    otp.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_secrets_are_unique_and_url_safe() {
        let a = generate_opaque_secret();
        let b = generate_opaque_secret();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43); // 32 bytes, base64url without padding
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn hash_secret_is_deterministic_and_one_way() {
        let secret = generate_opaque_secret();
        let h1 = hash_secret(&secret);
        let h2 = hash_secret(&secret);
        assert_eq!(h1, h2);
        assert_ne!(h1, secret);
        assert_ne!(hash_secret("other"), h1);
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..32 {
            let otp = generate_numeric_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            assert!(!otp.starts_with('0'));
        }
    }
}
