//! JWT token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Lifetime of every issued token
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Username of the authenticated principal
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// JWT manager for token generation and validation
///
/// The signing key is fixed at construction; nothing is read from the
/// environment when a token is issued or checked.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str) -> Self {
        // Expiry is checked by hand against the caller's clock, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Generate a token for a user, valid for one hour from now
    pub fn generate_token(&self, username: &str) -> Result<String, AuthError> {
        self.generate_token_at(username, Utc::now())
    }

    /// Generate a token as if issued at `now`
    pub fn generate_token_at(&self, username: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let exp = now + Duration::seconds(TOKEN_TTL_SECONDS);

        let claims = Claims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        debug!("Generating token for user: {}", username);

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validate a token against the clock reading `now`
    ///
    /// Fails on a bad signature, on a claim set that is not
    /// `{username, iat, exp}` with a non-empty username, and once `now`
    /// reaches `exp`.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let claims = token_data.claims;

        if claims.username.is_empty() {
            return Err(AuthError::MalformedClaims);
        }

        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
