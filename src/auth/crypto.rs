use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

pub type HmacSha256 = Hmac<Sha256>;

const RANDOM_TOKEN_BYTES: usize = 32;
const COMPARE_KEY: &[u8] = b"car_notes.crypto.compare";

/// 32 bytes from the OS rng, base64url without padding.
pub fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// MAC keyed by `sha256(salt || secret)`, so each purpose gets its own key.
pub fn salted_mac(salt: &str, secret: &[u8]) -> HmacSha256 {
    let key = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(secret)
        .finalize();
    // HMAC accepts keys of any length.
    match HmacSha256::new_from_slice(&key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("hmac accepts any key length"),
    }
}

pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let expected = salted_mac("compare", COMPARE_KEY)
        .chain_update(a.as_bytes())
        .finalize()
        .into_bytes();
    salted_mac("compare", COMPARE_KEY)
        .chain_update(b.as_bytes())
        .verify_slice(&expected)
        .is_ok()
}
