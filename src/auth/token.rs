//! Stateless activation and password-reset tokens.
//!
//! A token is `<base36 unix seconds>-<base64url truncated HMAC>`. The MAC
//! covers the user's id, password hash, last login, email and the issue time,
//! so a token stops verifying as soon as any of those change or the window
//! passes. `is_active` is left out, so activating twice with the
//! same link succeeds both times.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::Mac;
use uuid::Uuid;

use super::crypto::salted_mac;
use crate::db::entities::user;

const TOKEN_SALT: &str = "car_notes.auth.tokens.AccountTokenGenerator";
const SESSION_HASH_SALT: &str = "car_notes.auth.session.SessionAuthHash";
const TAG_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token or uid could not be decoded")]
    Decode,
    #[error("no user matches the encoded uid")]
    UserNotFound,
    #[error("token signature or age check failed")]
    Invalid,
}

pub fn encode_uid(id: &Uuid) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

pub fn decode_uid(uidb64: &str) -> Result<Uuid, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(uidb64.trim_end_matches('='))
        .map_err(|_| TokenError::Decode)?;
    let text = std::str::from_utf8(&bytes).map_err(|_| TokenError::Decode)?;
    Uuid::parse_str(text).map_err(|_| TokenError::Decode)
}

#[derive(Clone)]
pub struct TokenGenerator {
    secret: Vec<u8>,
    ttl_secs: u64,
}

impl TokenGenerator {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            secret: secret.to_vec(),
            ttl_secs,
        }
    }

    pub fn issue(&self, user: &user::Model) -> String {
        self.issue_at(user, Utc::now().timestamp())
    }

    pub fn issue_at(&self, user: &user::Model, timestamp: i64) -> String {
        let tag = self.tag(user, timestamp).finalize().into_bytes();
        format!(
            "{}-{}",
            to_base36(timestamp.max(0) as u64),
            URL_SAFE_NO_PAD.encode(&tag[..TAG_LEN])
        )
    }

    pub fn verify(&self, user: &user::Model, token: &str) -> Result<(), TokenError> {
        self.verify_at(user, token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, user: &user::Model, token: &str, now: i64) -> Result<(), TokenError> {
        let (ts_b36, tag_b64) = token.split_once('-').ok_or(TokenError::Decode)?;
        let timestamp = from_base36(ts_b36).ok_or(TokenError::Decode)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag_b64)
            .map_err(|_| TokenError::Decode)?;
        if tag.len() != TAG_LEN {
            return Err(TokenError::Invalid);
        }

        self.tag(user, timestamp)
            .verify_truncated_left(&tag)
            .map_err(|_| TokenError::Invalid)?;

        if now.saturating_sub(timestamp) > self.ttl_secs as i64 {
            return Err(TokenError::Invalid);
        }
        Ok(())
    }

    /// Binds a session to the password it was opened with.
    pub fn session_auth_hash(&self, password_hash: &str) -> String {
        let tag = salted_mac(SESSION_HASH_SALT, &self.secret)
            .chain_update(password_hash.as_bytes())
            .finalize()
            .into_bytes();
        URL_SAFE_NO_PAD.encode(tag)
    }

    fn tag(&self, user: &user::Model, timestamp: i64) -> super::crypto::HmacSha256 {
        let last_login = user
            .last_login_at
            .map(|at| at.timestamp().to_string())
            .unwrap_or_default();
        salted_mac(TOKEN_SALT, &self.secret)
            .chain_update(user.id.to_string())
            .chain_update(&user.password_hash)
            .chain_update(last_login)
            .chain_update(timestamp.to_string())
            .chain_update(&user.email)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn from_base36(value: &str) -> Option<i64> {
    // Thirteen base36 digits already overflow i64.
    if value.is_empty() || value.len() > 12 {
        return None;
    }
    i64::from_str_radix(value, 36).ok()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{TokenError, TokenGenerator, decode_uid, encode_uid, from_base36, to_base36};
    use crate::test_helpers::{ts, user_model};

    const NOW: i64 = 1_767_225_600;

    fn generator() -> TokenGenerator {
        TokenGenerator::new(b"test-secret-key-0123456789", 86_400)
    }

    #[test]
    fn fresh_token_verifies_repeatedly() {
        let user = user_model(Uuid::now_v7(), "alice@example.com", "alice");
        let token = generator().issue_at(&user, NOW);

        assert_eq!(generator().verify_at(&user, &token, NOW + 10), Ok(()));
        assert_eq!(generator().verify_at(&user, &token, NOW + 20), Ok(()));
    }

    #[test]
    fn activation_does_not_invalidate_token() {
        let mut user = user_model(Uuid::now_v7(), "alice@example.com", "alice");
        user.is_active = false;
        let token = generator().issue_at(&user, NOW);

        user.is_active = true;
        assert_eq!(generator().verify_at(&user, &token, NOW), Ok(()));
    }

    #[test]
    fn password_change_invalidates_token() {
        let mut user = user_model(Uuid::now_v7(), "alice@example.com", "alice");
        let token = generator().issue_at(&user, NOW);

        user.password_hash = "new-hash".to_string();
        assert_eq!(
            generator().verify_at(&user, &token, NOW),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn login_invalidates_token() {
        let mut user = user_model(Uuid::now_v7(), "alice@example.com", "alice");
        let token = generator().issue_at(&user, NOW);

        user.last_login_at = Some(ts());
        assert_eq!(
            generator().verify_at(&user, &token, NOW),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let user = user_model(Uuid::now_v7(), "alice@example.com", "alice");
        let token = generator().issue_at(&user, NOW);

        assert_eq!(generator().verify_at(&user, &token, NOW + 86_400), Ok(()));
        assert_eq!(
            generator().verify_at(&user, &token, NOW + 86_401),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn token_for_other_user_is_rejected() {
        let alice = user_model(Uuid::now_v7(), "alice@example.com", "alice");
        let bob = user_model(Uuid::now_v7(), "bob@example.com", "bob");
        let token = generator().issue_at(&alice, NOW);

        assert_eq!(
            generator().verify_at(&bob, &token, NOW),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn other_secret_is_rejected() {
        let user = user_model(Uuid::now_v7(), "alice@example.com", "alice");
        let token = generator().issue_at(&user, NOW);
        let other = TokenGenerator::new(b"another-secret-key-98765", 86_400);

        assert_eq!(other.verify_at(&user, &token, NOW), Err(TokenError::Invalid));
    }

    #[test]
    fn malformed_tokens_fail_to_decode() {
        let user = user_model(Uuid::now_v7(), "alice@example.com", "alice");

        assert_eq!(
            generator().verify_at(&user, "no-dash-here!", NOW),
            Err(TokenError::Decode)
        );
        assert_eq!(
            generator().verify_at(&user, "nodash", NOW),
            Err(TokenError::Decode)
        );
        assert_eq!(
            generator().verify_at(&user, "abc-AAAA", NOW),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn uid_encoding_roundtrips_and_rejects_garbage() {
        let id = Uuid::now_v7();

        assert_eq!(decode_uid(&encode_uid(&id)), Ok(id));
        assert_eq!(decode_uid("%%%"), Err(TokenError::Decode));
        assert_eq!(decode_uid("aGVsbG8"), Err(TokenError::Decode));
    }

    #[test]
    fn base36_matches_radix_parse() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(NOW as u64), "t85s00");
        assert_eq!(from_base36("t85s00"), Some(NOW));
        assert_eq!(from_base36(""), None);
    }

    #[test]
    fn session_hash_tracks_password_hash() {
        let generator = generator();

        assert_eq!(
            generator.session_auth_hash("hash-a"),
            generator.session_auth_hash("hash-a")
        );
        assert_ne!(
            generator.session_auth_hash("hash-a"),
            generator.session_auth_hash("hash-b")
        );
    }
}
