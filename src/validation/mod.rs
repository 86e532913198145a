//! Declarative field validation.
//!
//! Each form declares a static table of [`FieldSpec`]s mapping a field name to
//! its ordered rules and the message each rule reports. [`validate_fields`]
//! walks the table and records at most one message per field: the first rule
//! that fails.

use std::collections::BTreeMap;

use serde::Serialize;

pub const USERNAME_MAX_LENGTH: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present and non-blank once trimmed.
    Required,
    /// At most this many characters.
    MaxLength(usize),
    Email,
    /// Letters, digits and `@ . + - _`.
    Username,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub rule: Rule,
    pub message: &'static str,
}

impl FieldRule {
    pub const fn new(rule: Rule, message: &'static str) -> Self {
        Self { rule, message }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rules: &'static [FieldRule],
}

/// Anything that can hand out a raw field value by its wire name.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn extend<I>(&mut self, field: &str, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        for message in messages {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn validate_fields(specs: &[FieldSpec], source: &impl FieldSource) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for spec in specs {
        let value = source.field(spec.name).map(str::trim);
        if let Some(failed) = spec.rules.iter().find(|rule| !passes(rule.rule, value)) {
            errors.add(spec.name, failed.message);
        }
    }

    errors
}

fn passes(rule: Rule, value: Option<&str>) -> bool {
    match (rule, value) {
        (Rule::Required, value) => value.is_some_and(|value| !value.is_empty()),
        // Absent values are only judged by `Required`.
        (_, None) => true,
        (Rule::MaxLength(max), Some(value)) => value.chars().count() <= max,
        (Rule::Email, Some(value)) => is_valid_email(value),
        (Rule::Username, Some(value)) => is_valid_username(value),
    }
}

pub fn is_valid_email(value: &str) -> bool {
    // Display-name forms ("Alice <a@b.c>") parse as valid addresses; reject them.
    if value.contains(['<', '>', ' ']) {
        return false;
    }
    match value.parse::<email_address::EmailAddress>() {
        Ok(address) => address.domain().contains('.'),
        Err(_) => false,
    }
}

pub fn is_valid_username(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::{
        FieldRule, FieldSource, FieldSpec, Rule, ValidationErrors, is_valid_email,
        validate_fields,
    };

    struct Form {
        name: Option<String>,
        email: Option<String>,
    }

    impl FieldSource for Form {
        fn field(&self, name: &str) -> Option<&str> {
            match name {
                "name" => self.name.as_deref(),
                "email" => self.email.as_deref(),
                _ => None,
            }
        }
    }

    const SPECS: &[FieldSpec] = &[
        FieldSpec {
            name: "name",
            rules: &[
                FieldRule::new(Rule::Required, "Name is required."),
                FieldRule::new(Rule::MaxLength(5), "Name is too long."),
                FieldRule::new(Rule::Username, "Name is invalid."),
            ],
        },
        FieldSpec {
            name: "email",
            rules: &[
                FieldRule::new(Rule::Required, "Email is required."),
                FieldRule::new(Rule::Email, "Enter a valid email address."),
            ],
        },
    ];

    fn form(name: Option<&str>, email: Option<&str>) -> Form {
        Form {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn missing_and_blank_values_report_required() {
        let errors = validate_fields(SPECS, &form(None, Some("   ")));

        assert_eq!(errors.messages("name"), ["Name is required."]);
        assert_eq!(errors.messages("email"), ["Email is required."]);
    }

    #[test]
    fn only_first_failing_rule_is_reported() {
        let errors = validate_fields(SPECS, &form(Some("bad name!"), Some("a@b.io")));

        assert_eq!(errors.messages("name"), ["Name is too long."]);
        assert!(!errors.contains("email"));
    }

    #[test]
    fn values_are_trimmed_before_checks() {
        let errors = validate_fields(SPECS, &form(Some("  bob "), Some(" bob@example.com ")));

        assert!(errors.is_empty());
    }

    #[test]
    fn username_charset_rejects_symbols() {
        let errors = validate_fields(SPECS, &form(Some("a#b"), Some("a@b.io")));

        assert_eq!(errors.messages("name"), ["Name is invalid."]);
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@localhost"));
        assert!(!is_valid_email("Alice <alice@example.com>"));
    }

    #[test]
    fn errors_serialize_as_field_map() {
        let errors = ValidationErrors::single("password", "Wrong password.");

        assert_eq!(
            serde_json::to_value(&errors).expect("errors should serialize"),
            serde_json::json!({ "password": ["Wrong password."] })
        );
    }
}
