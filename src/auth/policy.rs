use std::collections::HashMap;

use crate::config::PasswordConfig;

const MAX_SIMILARITY: f64 = 0.7;

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "123456789", "12345678", "password", "qwerty", "1234567", "12345", "1234567890",
    "111111", "123123", "abc123", "password1", "1234", "iloveyou", "qwerty123", "000000",
    "dragon", "sunshine", "princess", "letmein", "monkey", "football", "baseball", "welcome",
    "shadow", "superman", "michael", "master", "qwertyuiop", "trustno1", "passw0rd",
    "password123", "starwars", "whatever", "freedom", "hello123", "charlie", "donald",
    "zaq12wsx", "qazwsx", "1q2w3e4r", "1qaz2wsx", "asdfghjkl", "asdfgh", "987654321",
    "654321", "123321", "666666", "121212", "88888888", "11111111", "aaaaaaaa", "ashley",
    "bailey", "jennifer", "jordan23", "hunter2", "computer", "internet", "batman", "access",
    "mustang", "liverpool", "chelsea", "arsenal", "cookie", "flower", "hottie", "loveme",
    "pokemon", "soccer", "killer", "jessica", "pepper", "ginger", "summer", "secret",
    "login", "admin", "admin123", "administrator", "root", "changeme", "default", "guest",
    "test1234", "testtest", "qwer1234", "abcd1234", "abcdefgh", "iloveyou1", "lovely",
    "princess1", "sunshine1", "football1", "welcome1", "password2", "p@ssw0rd", "carnotes",
];

/// Rule set applied to new passwords. Every failing rule contributes a message.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    reject_numeric: bool,
    reject_common: bool,
    reject_similar: bool,
}

impl PasswordPolicy {
    pub fn new(cfg: &PasswordConfig) -> Self {
        Self {
            min_length: cfg.min_length,
            reject_numeric: cfg.reject_numeric,
            reject_common: cfg.reject_common,
            reject_similar: cfg.reject_similar,
        }
    }

    pub fn check(&self, password: &str, username: &str, email: &str) -> Vec<String> {
        let mut errors = Vec::new();

        if self.reject_similar {
            if too_similar(password, [username]) {
                errors.push("The password is too similar to the username.".to_string());
            }
            let local = email.split('@').next().unwrap_or_default();
            if too_similar(password, [email, local]) {
                errors.push("The password is too similar to the email address.".to_string());
            }
        }

        if password.chars().count() < self.min_length {
            errors.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ));
        }

        let folded = password.trim().to_lowercase();
        if self.reject_common && COMMON_PASSWORDS.contains(&folded.as_str()) {
            errors.push("This password is too common.".to_string());
        }

        let numeric = !password.is_empty() && password.chars().all(|c| c.is_ascii_digit());
        if self.reject_numeric && numeric {
            errors.push("This password is entirely numeric.".to_string());
        }

        errors
    }
}

fn too_similar<'a>(password: &str, attributes: impl IntoIterator<Item = &'a str>) -> bool {
    let password = password.to_lowercase();
    attributes.into_iter().any(|value| {
        let value = value.to_lowercase();
        std::iter::once(value.as_str())
            .chain(value.split(|c: char| !c.is_alphanumeric()))
            .filter(|part| !part.is_empty())
            .filter(|part| !far_shorter(&password, part))
            .any(|part| quick_ratio(&password, part) >= MAX_SIMILARITY)
    })
}

/// A long password is not "similar" to a much shorter attribute it merely contains.
fn far_shorter(password: &str, part: &str) -> bool {
    let password_len = password.chars().count() as f64;
    let part_len = part.chars().count() as f64;
    password_len >= 10.0 * part_len && part_len < MAX_SIMILARITY / 2.0 * password_len
}

/// Upper bound on the matching-blocks ratio: shared characters, ignoring order.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }
    let matches = a
        .chars()
        .filter(|c| match available.get_mut(c) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .count();

    2.0 * matches as f64 / total as f64
}
