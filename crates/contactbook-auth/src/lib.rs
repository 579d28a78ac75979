//! Contactbook Authentication and Authorization
//!
//! This crate provides username/password login backed by signed,
//! time-limited JWTs, and the two-stage access gate that guards every
//! protected route: the token is verified first, then the principal it
//! names is looked up again in the credential store.

pub mod error;
pub mod jwt;
pub mod login;
pub mod messages;
pub mod middleware;
pub mod password;
pub mod rules;
pub mod store;
pub mod validation;

#[cfg(test)]
mod testing;

pub use error::{AuthError, AuthRejection};
pub use jwt::{Claims, JwtManager, TOKEN_TTL_SECONDS};
pub use login::LoginFlow;
pub use middleware::{AccessGate, AuthenticatedUser, confirm_principal, verify_token};
pub use password::{hash_password, verify_password, verify_password_blocking};
pub use rules::{AuthorizationHeader, LoginRequest};
pub use store::{CredentialStore, Principal};
pub use validation::{FieldMessage, LenientJson, Validate, ValidatedJson, ValidatedQuery, ValidationErrors, validated};
