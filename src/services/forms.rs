//! Request bodies and the field rules each one is checked against.
//!
//! Every field is optional at the serde level so a missing value turns into a
//! field message instead of a body rejection.

use serde::Deserialize;

use crate::db::entities::car::MAX_FIELD_LENGTH;
use crate::validation::{FieldRule, FieldSource, FieldSpec, Rule, USERNAME_MAX_LENGTH};

const TOO_LONG: &str = "Ensure this field has no more than 255 characters.";

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: Option<String>,
}

pub const REGISTER_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "username",
        rules: &[
            FieldRule::new(Rule::Required, "Username is required."),
            FieldRule::new(Rule::MaxLength(USERNAME_MAX_LENGTH), "Username is too long."),
            FieldRule::new(
                Rule::Username,
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            ),
        ],
    },
    FieldSpec {
        name: "email",
        rules: &[
            FieldRule::new(Rule::Required, "Email is required."),
            FieldRule::new(Rule::MaxLength(254), "Enter a valid email address."),
            FieldRule::new(Rule::Email, "Enter a valid email address."),
        ],
    },
    FieldSpec {
        name: "password",
        rules: &[FieldRule::new(Rule::Required, "Password is required.")],
    },
    FieldSpec {
        name: "confirmPassword",
        rules: &[FieldRule::new(Rule::Required, "Password confirmation is required.")],
    },
];

impl FieldSource for RegisterForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "username" => self.username.as_deref(),
            "email" => self.email.as_deref(),
            "password" => self.password.as_deref(),
            "confirmPassword" => self.confirm_password.as_deref(),
            _ => None,
        }
    }
}

/// `email` also accepts `username` or `identifier`; any of them may hold
/// either an email address or a username.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(alias = "username", alias = "identifier")]
    pub email: Option<String>,
    pub password: Option<String>,
}

pub const LOGIN_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "email",
        rules: &[FieldRule::new(Rule::Required, "Email is required.")],
    },
    FieldSpec {
        name: "password",
        rules: &[FieldRule::new(Rule::Required, "Password is required.")],
    },
];

impl FieldSource for LoginForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => self.email.as_deref(),
            "password" => self.password.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PasswordResetRequestForm {
    pub email: Option<String>,
}

pub const PASSWORD_RESET_REQUEST_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "email",
    rules: &[
        FieldRule::new(Rule::Required, "Email is required."),
        FieldRule::new(Rule::Email, "Enter a valid email address."),
    ],
}];

impl FieldSource for PasswordResetRequestForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => self.email.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordForm {
    pub new_password: Option<String>,
    pub new_password_confirm: Option<String>,
}

pub const NEW_PASSWORD_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "newPassword",
        rules: &[FieldRule::new(Rule::Required, "New password is required.")],
    },
    FieldSpec {
        name: "newPasswordConfirm",
        rules: &[FieldRule::new(
            Rule::Required,
            "New password confirmation is required.",
        )],
    },
];

impl FieldSource for NewPasswordForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "newPassword" => self.new_password.as_deref(),
            "newPasswordConfirm" => self.new_password_confirm.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    pub old_password: Option<String>,
    #[serde(flatten)]
    pub new: NewPasswordForm,
}

pub const OLD_PASSWORD_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "oldPassword",
    rules: &[FieldRule::new(Rule::Required, "Old password is required.")],
}];

impl FieldSource for ChangePasswordForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "oldPassword" => self.old_password.as_deref(),
            other => self.new.field(other),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteAccountForm {
    pub password: Option<String>,
}

pub const DELETE_ACCOUNT_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "password",
    rules: &[FieldRule::new(Rule::Required, "Password confirmation is required.")],
}];

impl FieldSource for DeleteAccountForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "password" => self.password.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CarForm {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub motor: Option<String>,
}

pub const CAR_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "brand",
        rules: &[
            FieldRule::new(Rule::Required, "Brand is required."),
            FieldRule::new(Rule::MaxLength(MAX_FIELD_LENGTH), TOO_LONG),
        ],
    },
    FieldSpec {
        name: "model",
        rules: &[
            FieldRule::new(Rule::Required, "Model is required."),
            FieldRule::new(Rule::MaxLength(MAX_FIELD_LENGTH), TOO_LONG),
        ],
    },
    FieldSpec {
        name: "motor",
        rules: &[
            FieldRule::new(Rule::Required, "Motor is required."),
            FieldRule::new(Rule::MaxLength(MAX_FIELD_LENGTH), TOO_LONG),
        ],
    },
];

impl FieldSource for CarForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "brand" => self.brand.as_deref(),
            "model" => self.model.as_deref(),
            "motor" => self.motor.as_deref(),
            _ => None,
        }
    }
}

/// Trimmed value of a field that already passed `Required`.
pub(crate) fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        CAR_FIELDS, CarForm, ChangePasswordForm, LoginForm, REGISTER_FIELDS, RegisterForm,
    };
    use crate::validation::{FieldSource, validate_fields};

    #[test]
    fn register_form_reads_camel_case_confirmation() {
        let form: RegisterForm = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "pw",
            "confirmPassword": "pw",
        }))
        .expect("form should parse");

        assert!(validate_fields(REGISTER_FIELDS, &form).is_empty());
    }

    #[test]
    fn empty_register_form_reports_every_required_field() {
        let errors = validate_fields(REGISTER_FIELDS, &RegisterForm::default());

        assert_eq!(errors.messages("username"), ["Username is required."]);
        assert_eq!(errors.messages("email"), ["Email is required."]);
        assert_eq!(errors.messages("password"), ["Password is required."]);
        assert_eq!(
            errors.messages("confirmPassword"),
            ["Password confirmation is required."]
        );
    }

    #[test]
    fn login_accepts_identifier_aliases() {
        for key in ["email", "username", "identifier"] {
            let body = format!(r#"{{"{key}": "alice", "password": "pw"}}"#);
            let form: LoginForm = serde_json::from_str(&body).expect("form should parse");
            assert_eq!(form.email.as_deref(), Some("alice"));
        }
    }

    #[test]
    fn change_password_form_flattens_new_password_fields() {
        let form: ChangePasswordForm = serde_json::from_value(serde_json::json!({
            "oldPassword": "old",
            "newPassword": "new",
            "newPasswordConfirm": "new",
        }))
        .expect("form should parse");

        assert_eq!(form.field("oldPassword"), Some("old"));
        assert_eq!(form.field("newPasswordConfirm"), Some("new"));
    }

    #[test]
    fn car_fields_are_capped_at_255_characters() {
        let form = CarForm {
            brand: Some("a".repeat(256)),
            model: Some("A4".to_string()),
            motor: None,
        };

        let errors = validate_fields(CAR_FIELDS, &form);

        assert_eq!(
            errors.messages("brand"),
            ["Ensure this field has no more than 255 characters."]
        );
        assert!(!errors.contains("model"));
        assert_eq!(errors.messages("motor"), ["Motor is required."]);
    }
}
