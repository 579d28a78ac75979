//! Request and response types for the user routes

use chrono::{DateTime, Utc};
use contactbook_auth::rules::{
    email_rules, optional_email_rules, optional_password_rules, optional_username_rules,
    password_rules, username_rules,
};
use contactbook_auth::{Validate, ValidationErrors};
use contactbook_db::{User, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_REQUIRED_MESSAGE: &str = "Role is a required field";
pub const ROLE_INVALID_MESSAGE: &str = "Role must be either Admin or user";
pub const USER_ID_REQUIRED_MESSAGE: &str = "User ID is a required field";
pub const USER_ID_INVALID_MESSAGE: &str = "User ID is not valid";

pub const USER_REGISTERED: &str = "Successful user registration";
pub const USER_UPDATED: &str = "Successful user update";
pub const USER_RETRIEVED: &str = "Successful user retrieval";
pub const USERS_RETRIEVED: &str = "Successful retrieval of users";
pub const USER_NOT_FOUND: &str = "User was not found";
pub const USERS_NOT_FOUND: &str = "Users were not found";

const ROLES: [&str; 2] = ["Admin", "User"];

fn role_rules(errors: &mut ValidationErrors, role: Option<&str>) {
    errors
        .field(role)
        .not_empty(ROLE_REQUIRED_MESSAGE)
        .is_in(&ROLES, ROLE_INVALID_MESSAGE);
}

fn user_id_rules(errors: &mut ValidationErrors, id: Option<&str>) {
    errors
        .field(id)
        .not_empty(USER_ID_REQUIRED_MESSAGE)
        .satisfies(|id| Uuid::parse_str(id).is_ok(), USER_ID_INVALID_MESSAGE);
}

/// Parse a role that already passed [`role_rules`]
pub(crate) fn parse_role(role: Option<&str>) -> UserRole {
    role.and_then(|r| r.parse().ok()).unwrap_or(UserRole::User)
}

// ==================== Requests ====================

#[derive(Debug, Default, Deserialize)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Validate for RegisterUserRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        username_rules(&mut errors, self.username.as_deref());
        email_rules(&mut errors, self.email.as_deref());
        password_rules(&mut errors, self.password.as_deref());
        role_rules(&mut errors, self.role.as_deref());
        errors
    }
}

/// Only the fields present in the body are changed
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        user_id_rules(&mut errors, self.id.as_deref());
        optional_username_rules(&mut errors, self.username.as_deref());
        optional_email_rules(&mut errors, self.email.as_deref());
        optional_password_rules(&mut errors, self.password.as_deref());
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UsernameQuery {
    #[serde(default)]
    pub username: Option<String>,
}

impl Validate for UsernameQuery {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        username_rules(&mut errors, self.username.as_deref());
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: Option<String>,
}

impl Validate for EmailQuery {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        email_rules(&mut errors, self.email.as_deref());
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleQuery {
    #[serde(default)]
    pub role: Option<String>,
}

impl Validate for RoleQuery {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        role_rules(&mut errors, self.role.as_deref());
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(default)]
    pub id: Option<String>,
}

impl Validate for DeleteUserRequest {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        user_id_rules(&mut errors, self.id.as_deref());
        errors
    }
}

// ==================== Responses ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: &'static str,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UsersEnvelope {
    pub message: &'static str,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
}
