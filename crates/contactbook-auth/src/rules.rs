//! Field rules for login bodies and authorization headers
//!
//! The per-field rule chains are public so that other request types
//! carrying the same fields (user registration, lookups) report exactly the
//! same messages.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::messages::{AUTHORIZATION_HEADER_REQUIRED, AUTHORIZATION_TOKEN_INVALID};
use crate::validation::{Validate, ValidationErrors};

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 20;
pub const PASSWORD_MIN_LENGTH: usize = 7;

pub const USERNAME_REQUIRED_MESSAGE: &str = "Username is a required field";
pub const USERNAME_BELOW_MIN_LENGTH_MESSAGE: &str = "Username must be at least 3 characters long";
pub const USERNAME_ABOVE_MAX_LENGTH_MESSAGE: &str = "Username must be no longer than 20 characters";
pub const EMAIL_REQUIRED_MESSAGE: &str = "User email is a required field";
pub const EMAIL_INVALID_MESSAGE: &str = "User email is not valid";
pub const PASSWORD_REQUIRED_MESSAGE: &str = "Password is a required field";
pub const PASSWORD_BELOW_MIN_LENGTH_MESSAGE: &str = "Password must be at least 7 characters long";
pub const PASSWORD_MUST_HAVE_CHARACTERS_MESSAGE: &str = "Password must have at least: one lowercase character, one uppercase character, one number, and one special symbol";

/// Bearer prefix stripped from the authorization header
pub const BEARER_PREFIX: &str = "Bearer ";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Compact JWS shape, optionally behind the bearer prefix
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Bearer )?[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+$")
        .expect("valid token regex")
});

/// Lowercase, uppercase, digit, and a symbol (anything outside ASCII `\w`, or `_`)
fn is_strong_password(value: &str) -> bool {
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_symbol = value.chars().any(|c| c == '_' || !c.is_ascii_alphanumeric());
    has_lower && has_upper && has_digit && has_symbol
}

pub fn username_rules(errors: &mut ValidationErrors, username: Option<&str>) {
    errors
        .field(username)
        .not_empty(USERNAME_REQUIRED_MESSAGE)
        .min_length(USERNAME_MIN_LENGTH, USERNAME_BELOW_MIN_LENGTH_MESSAGE)
        .max_length(USERNAME_MAX_LENGTH, USERNAME_ABOVE_MAX_LENGTH_MESSAGE);
}

pub fn password_rules(errors: &mut ValidationErrors, password: Option<&str>) {
    errors
        .field(password)
        .not_empty(PASSWORD_REQUIRED_MESSAGE)
        .min_length(PASSWORD_MIN_LENGTH, PASSWORD_BELOW_MIN_LENGTH_MESSAGE)
        .satisfies(is_strong_password, PASSWORD_MUST_HAVE_CHARACTERS_MESSAGE);
}

pub fn email_rules(errors: &mut ValidationErrors, email: Option<&str>) {
    errors
        .field(email)
        .not_empty(EMAIL_REQUIRED_MESSAGE)
        .matches(&EMAIL_REGEX, EMAIL_INVALID_MESSAGE);
}

/// Username rules for a field that may be omitted
///
/// An absent value passes; a present one, even empty, must satisfy the
/// length bounds.
pub fn optional_username_rules(errors: &mut ValidationErrors, username: Option<&str>) {
    let Some(username) = username else {
        return;
    };
    errors
        .field(Some(username))
        .min_length(USERNAME_MIN_LENGTH, USERNAME_BELOW_MIN_LENGTH_MESSAGE)
        .max_length(USERNAME_MAX_LENGTH, USERNAME_ABOVE_MAX_LENGTH_MESSAGE);
}

pub fn optional_email_rules(errors: &mut ValidationErrors, email: Option<&str>) {
    let Some(email) = email else {
        return;
    };
    errors
        .field(Some(email))
        .matches(&EMAIL_REGEX, EMAIL_INVALID_MESSAGE);
}

pub fn optional_password_rules(errors: &mut ValidationErrors, password: Option<&str>) {
    let Some(password) = password else {
        return;
    };
    errors
        .field(Some(password))
        .min_length(PASSWORD_MIN_LENGTH, PASSWORD_BELOW_MIN_LENGTH_MESSAGE)
        .satisfies(is_strong_password, PASSWORD_MUST_HAVE_CHARACTERS_MESSAGE);
}

/// Login request body
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Validate for LoginRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        username_rules(&mut errors, self.username.as_deref());
        password_rules(&mut errors, self.password.as_deref());
        errors
    }
}

/// The `Authorization` header of a request, as sent
#[derive(Debug, Default)]
pub struct AuthorizationHeader {
    value: Option<String>,
}

impl AuthorizationHeader {
    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let value = headers
            .get(AUTHORIZATION)
            .map(|h| String::from_utf8_lossy(h.as_bytes()).into_owned());
        Self { value }
    }

    /// The token with any bearer prefix removed
    pub fn token(&self) -> &str {
        let value = self.value.as_deref().unwrap_or("");
        value.strip_prefix(BEARER_PREFIX).unwrap_or(value)
    }
}

impl Validate for AuthorizationHeader {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        errors
            .field(self.value.as_deref())
            .not_empty(AUTHORIZATION_HEADER_REQUIRED)
            .matches(&TOKEN_REGEX, AUTHORIZATION_TOKEN_INVALID);
        errors
    }
}
