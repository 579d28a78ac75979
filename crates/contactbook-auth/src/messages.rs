//! Fixed response messages
//!
//! Every auth failure collapses onto one of these strings so a client can
//! never tell an unknown user from a wrong password, or an expired token
//! from a deleted principal.

pub const AUTHENTICATION_FAILED: &str = "Authentication failed";
pub const AUTHENTICATION_SUCCESS: &str = "Login successful";
pub const AUTHORIZATION_FAILED: &str = "Authorization failed";
pub const AUTHORIZATION_HEADER_REQUIRED: &str = "Authorization header is required";
pub const AUTHORIZATION_TOKEN_INVALID: &str = "Invalid token";
pub const BAD_REQUEST: &str = "Bad request";
pub const SERVER_ERROR: &str = "Internal server error";
