//! Account lifecycle: registration, activation, sessions, password recovery
//! and deletion.
//!
//! Lookups that could reveal whether an account exists (activation, login,
//! reset) collapse every failure into one generic message and do comparable
//! work on both branches.

use chrono::{Duration, Utc};
use futures_util::future::join_all;
use tracing::{debug, info};
use uuid::Uuid;

use super::forms::{
    ChangePasswordForm, DELETE_ACCOUNT_FIELDS, DeleteAccountForm, LOGIN_FIELDS, LoginForm,
    NEW_PASSWORD_FIELDS, NewPasswordForm, OLD_PASSWORD_FIELDS, PASSWORD_RESET_REQUEST_FIELDS,
    PasswordResetRequestForm, REGISTER_FIELDS, RegisterForm, trimmed,
};
use crate::{
    auth::{
        PasswordPolicy, TokenError,
        crypto::{constant_time_eq, random_token},
        decode_uid, encode_uid,
        password::{dummy_verify, hash_password, verify_password},
    },
    db::dao::{DaoBase, DaoLayerError, NewUser, UserDao},
    db::entities::user,
    error::AppError,
    mail::templates::{
        PLACEHOLDER_RECIPIENT, activation_email, activation_link, reset_email, reset_link,
    },
    sessions::{SessionPayload, SessionRecord},
    state::AppState,
    validation::{ValidationErrors, validate_fields},
};

pub const REGISTERED: &str = "Please check your email to activate your account.";
pub const ACTIVATED: &str = "Account activated successfully!";
pub const ACTIVATION_FAILED: &str = "Account Activation Failed.";
pub const LOGIN_FAILED: &str = "Could not log in.";
pub const RESET_REQUESTED: &str = "Please check your email to recover your password.";
pub const RESET_DONE: &str = "Password reset was successful!";
pub const RESET_FAILED: &str = "Password reset failed.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// A freshly opened session and the anti-forgery token bound to it.
#[derive(Debug, Clone)]
pub struct OpenedSession {
    pub user: user::Model,
    pub session: SessionRecord,
    pub csrf: String,
}

pub struct AccountService<'a> {
    state: &'a AppState,
    user_dao: UserDao,
    policy: PasswordPolicy,
}

impl<'a> AccountService<'a> {
    pub fn new(state: &'a AppState, user_dao: UserDao) -> Self {
        Self {
            state,
            user_dao,
            policy: PasswordPolicy::new(&state.config.password),
        }
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<(), AppError> {
        let mut errors = validate_fields(REGISTER_FIELDS, form);
        let username = trimmed(&form.username);
        let email = trimmed(&form.email);
        let password = form.password.clone().unwrap_or_default();

        if !errors.contains("username") {
            let taken = self.user_dao.find_by_username(&username).await?.is_some();
            if taken {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        if !errors.contains("password") && !errors.contains("confirmPassword") {
            if form.password != form.confirm_password {
                errors.add("password", "Passwords do not match.");
            } else {
                errors.extend("password", self.policy.check(&password, &username, &email));
            }
        }
        errors.into_result()?;

        // Re-registering an existing email only re-sends the link.
        if let Some(existing) = self.user_dao.find_by_email(&email).await? {
            debug!(user_id = %existing.id, "registration for existing email, resending activation");
            return self.send_activation(&existing).await;
        }

        let created = self
            .user_dao
            .create_user(NewUser {
                email: email.clone(),
                username: username.clone(),
                password_hash: hash_password(&password)?,
                is_active: false,
                is_admin: false,
            })
            .await;

        let user = match created {
            Ok(user) => user,
            Err(err) if err.is_unique_violation() => {
                // Lost a race with a concurrent registration.
                if let Some(existing) = self.user_dao.find_by_email(&email).await? {
                    return self.send_activation(&existing).await;
                }
                if self.user_dao.find_by_username(&username).await?.is_some() {
                    return Err(AppError::field("username", USERNAME_TAKEN));
                }
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        info!(user_id = %user.id, "user registered");
        self.send_activation(&user).await
    }

    pub async fn activate(&self, uidb64: &str, token: &str) -> Result<(), AppError> {
        let user = self
            .user_for_token(uidb64, token)
            .await?
            .map_err(|_| AppError::bad_request(ACTIVATION_FAILED))?;

        if !user.is_active {
            self.user_dao.activate(&user.id).await?;
            info!(user_id = %user.id, "account activated");
        }
        Ok(())
    }

    /// Replaces `previous_session` (if any) with a new session for the user.
    pub async fn login(
        &self,
        form: &LoginForm,
        previous_session: Option<&str>,
    ) -> Result<OpenedSession, AppError> {
        validate_fields(LOGIN_FIELDS, form).into_result()?;
        let identifier = trimmed(&form.email);
        let password = form.password.as_deref().unwrap_or_default();

        let Some(user) = self.user_dao.find_by_identifier(&identifier).await? else {
            dummy_verify(password);
            return Err(AppError::bad_request(LOGIN_FAILED));
        };
        if !verify_password(password, &user.password_hash)? || !user.is_active {
            return Err(AppError::bad_request(LOGIN_FAILED));
        }

        let now = Utc::now().fixed_offset();
        let user = self.user_dao.set_last_login(&user.id, &now).await?;
        if let Some(key) = previous_session {
            self.state.sessions.delete(key).await?;
        }

        let opened = self.open_session(user).await?;
        info!(user_id = %opened.user.id, "user logged in");
        Ok(opened)
    }

    pub async fn open_session(&self, user: user::Model) -> Result<OpenedSession, AppError> {
        let csrf = random_token();
        let payload = SessionPayload {
            user_id: user.id,
            csrf: csrf.clone(),
            auth_hash: self.state.tokens.session_auth_hash(&user.password_hash),
        };
        let ttl = Duration::seconds(self.state.config.session.ttl_secs as i64);
        let expires_at = Utc::now().fixed_offset() + ttl;
        let session = self.state.sessions.create(&payload, expires_at).await?;

        Ok(OpenedSession {
            user,
            session,
            csrf,
        })
    }

    /// True when the session's stored auth hash still matches the user's password.
    pub fn session_matches(&self, payload: &SessionPayload, user: &user::Model) -> bool {
        constant_time_eq(
            &payload.auth_hash,
            &self.state.tokens.session_auth_hash(&user.password_hash),
        )
    }

    pub async fn logout(&self, session_key: &str) -> Result<(), AppError> {
        self.state.sessions.delete(session_key).await?;
        Ok(())
    }

    /// Drops every live session whose payload names `user_id`.
    pub async fn logout_all(&self, user_id: &Uuid) -> Result<usize, AppError> {
        let sessions = self
            .state
            .sessions
            .list_active(Utc::now().fixed_offset())
            .await?;
        let owned: Vec<_> = sessions
            .iter()
            .filter(|record| {
                record
                    .decode()
                    .is_some_and(|payload| payload.user_id == *user_id)
            })
            .map(|record| self.state.sessions.delete(&record.key))
            .collect();

        let removed = join_all(owned)
            .await
            .into_iter()
            .collect::<Result<Vec<bool>, _>>()?
            .into_iter()
            .filter(|deleted| *deleted)
            .count();
        info!(user_id = %user_id, removed, "logged out of all sessions");
        Ok(removed)
    }

    pub async fn request_password_reset(
        &self,
        form: &PasswordResetRequestForm,
    ) -> Result<(), AppError> {
        validate_fields(PASSWORD_RESET_REQUEST_FIELDS, form).into_result()?;
        let email = trimmed(&form.email);
        let mail = &self.state.config.mail;
        let frontend_url = &self.state.config.general.frontend_url;

        let message = match self.user_dao.find_by_email(&email).await? {
            Some(user) => {
                let link = reset_link(
                    frontend_url,
                    &encode_uid(&user.id),
                    &self.state.tokens.issue(&user),
                );
                reset_email(&mail.from_address, &user.email, &user.username, &link)?
            }
            None => {
                // Same template and size as a real reset, sent nowhere useful.
                let decoy = self.state.tokens.issue(&decoy_user());
                let link = reset_link(frontend_url, &encode_uid(&Uuid::now_v7()), &decoy);
                reset_email(&mail.from_address, PLACEHOLDER_RECIPIENT, "", &link)?
            }
        };
        self.state.mailer.send(message).await?;
        Ok(())
    }

    pub async fn confirm_password_reset(
        &self,
        uidb64: &str,
        token: &str,
        form: &NewPasswordForm,
    ) -> Result<(), AppError> {
        let user = self
            .user_for_token(uidb64, token)
            .await?
            .map_err(|_| AppError::bad_request(RESET_FAILED))?;

        let new_password = self.check_new_password(form, &user)?;
        self.user_dao
            .set_password_hash(&user.id, &hash_password(&new_password)?)
            .await?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Sets a new password and swaps the caller's session for a fresh one.
    /// Every other session stops authenticating because its auth hash is stale.
    pub async fn change_password(
        &self,
        user: &user::Model,
        session_key: &str,
        form: &ChangePasswordForm,
    ) -> Result<OpenedSession, AppError> {
        validate_fields(OLD_PASSWORD_FIELDS, form).into_result()?;
        let old_password = form.old_password.as_deref().unwrap_or_default();
        if !verify_password(old_password, &user.password_hash)? {
            return Err(AppError::field("password", "Wrong old password."));
        }

        let new_password = self.check_new_password(&form.new, user)?;
        let updated = self
            .user_dao
            .set_password_hash(&user.id, &hash_password(&new_password)?)
            .await?;
        self.state.sessions.delete(session_key).await?;
        info!(user_id = %user.id, "password changed");
        self.open_session(updated).await
    }

    pub async fn delete_account(
        &self,
        user: &user::Model,
        form: &DeleteAccountForm,
    ) -> Result<(), AppError> {
        validate_fields(DELETE_ACCOUNT_FIELDS, form).into_result()?;
        let password = form.password.as_deref().unwrap_or_default();
        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::field("password", "Wrong password."));
        }

        let cars = match self.user_dao.delete_with_cars(&user.id).await {
            Ok(cars) => cars,
            // Deleted concurrently; the outcome is the same.
            Err(DaoLayerError::NotFound { .. }) => 0,
            Err(err) => return Err(err.into()),
        };
        self.logout_all(&user.id).await?;
        info!(user_id = %user.id, cars, "account deleted");
        Ok(())
    }

    /// Outer error: storage failure. Inner error: the link is not valid for anyone.
    async fn user_for_token(
        &self,
        uidb64: &str,
        token: &str,
    ) -> Result<Result<user::Model, TokenError>, AppError> {
        let id = match decode_uid(uidb64) {
            Ok(id) => id,
            Err(err) => return Ok(Err(err)),
        };
        let user = match self.user_dao.find_by_id(id).await {
            Ok(user) => user,
            Err(DaoLayerError::NotFound { .. }) => return Ok(Err(TokenError::UserNotFound)),
            Err(err) => return Err(err.into()),
        };

        Ok(match self.state.tokens.verify(&user, token) {
            Ok(()) => Ok(user),
            Err(err) => {
                debug!(user_id = %user.id, error = %err, "token rejected");
                Err(err)
            }
        })
    }

    fn check_new_password(
        &self,
        form: &NewPasswordForm,
        user: &user::Model,
    ) -> Result<String, AppError> {
        validate_fields(NEW_PASSWORD_FIELDS, form).into_result()?;
        let new_password = form.new_password.clone().unwrap_or_default();

        let mut errors = ValidationErrors::new();
        errors.extend(
            "password",
            self.policy.check(&new_password, &user.username, &user.email),
        );
        errors.into_result()?;

        if form.new_password != form.new_password_confirm {
            return Err(AppError::field("password", "New passwords do not match."));
        }
        Ok(new_password)
    }

    async fn send_activation(&self, user: &user::Model) -> Result<(), AppError> {
        let link = activation_link(
            &self.state.config.general.frontend_url,
            &encode_uid(&user.id),
            &self.state.tokens.issue(user),
        );
        let message = activation_email(
            &self.state.config.mail.from_address,
            &user.email,
            &user.username,
            &link,
        )?;
        self.state.mailer.send(message).await?;
        Ok(())
    }
}

fn decoy_user() -> user::Model {
    let now = Utc::now().fixed_offset();
    user::Model {
        id: Uuid::now_v7(),
        email: PLACEHOLDER_RECIPIENT.to_string(),
        username: String::new(),
        username_normalized: String::new(),
        password_hash: String::new(),
        is_active: false,
        is_admin: false,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}
