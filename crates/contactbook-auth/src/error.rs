//! Authentication error types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::messages::{AUTHENTICATION_FAILED, AUTHORIZATION_FAILED, SERVER_ERROR};
use crate::validation::ValidationErrors;

/// Failure causes produced by the auth building blocks
///
/// These never reach a client as-is. Each orchestrator maps them through
/// its own table ([`AuthError::into_login_rejection`],
/// [`AuthError::into_access_rejection`]) onto an [`AuthRejection`].
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Principal not found")]
    PrincipalNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token claims are malformed")]
    MalformedClaims,

    #[error("Request carries no verified principal")]
    MissingContext,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Mapping table for the login flow
    pub fn into_login_rejection(self) -> AuthRejection {
        match self {
            AuthError::Validation(errors) => AuthRejection::BadRequest(errors),
            AuthError::PrincipalNotFound | AuthError::InvalidCredentials => {
                AuthRejection::AuthenticationFailed
            }
            AuthError::TokenExpired
            | AuthError::MalformedClaims
            | AuthError::MissingContext
            | AuthError::PasswordHash(_)
            | AuthError::Store(_)
            | AuthError::Jwt(_) => AuthRejection::ServerError,
        }
    }

    /// Mapping table for the access gate
    pub fn into_access_rejection(self) -> AuthRejection {
        match self {
            AuthError::Validation(errors) => AuthRejection::BadRequest(errors),
            AuthError::PrincipalNotFound
            | AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::MalformedClaims
            | AuthError::MissingContext
            | AuthError::Jwt(_) => AuthRejection::AuthorizationFailed,
            AuthError::PasswordHash(_) | AuthError::Store(_) => AuthRejection::ServerError,
        }
    }
}

/// Outcome rendered at the HTTP boundary
#[derive(Debug)]
pub enum AuthRejection {
    /// 400 with every violated field rule
    BadRequest(ValidationErrors),
    /// 401, login only
    AuthenticationFailed,
    /// 403, access gate only
    AuthorizationFailed,
    /// 500 with a fixed message
    ServerError,
}

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthRejection::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthRejection::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AuthRejection::AuthorizationFailed => StatusCode::FORBIDDEN,
            AuthRejection::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for metrics and logs
    pub fn outcome(&self) -> &'static str {
        match self {
            AuthRejection::BadRequest(_) => "bad_request",
            AuthRejection::AuthenticationFailed => "authentication_failed",
            AuthRejection::AuthorizationFailed => "authorization_failed",
            AuthRejection::ServerError => "server_error",
        }
    }
}

impl From<ValidationErrors> for AuthRejection {
    fn from(errors: ValidationErrors) -> Self {
        AuthRejection::BadRequest(errors)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AuthRejection::BadRequest(errors) => return errors.into_response(),
            AuthRejection::AuthenticationFailed => AUTHENTICATION_FAILED,
            AuthRejection::AuthorizationFailed => AUTHORIZATION_FAILED,
            AuthRejection::ServerError => SERVER_ERROR,
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
