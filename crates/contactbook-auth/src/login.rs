//! Login flow
//!
//! Validate the body, look the principal up, check the password, issue a
//! token. Each step gates the next; nothing is retried. Unknown users and
//! wrong passwords end in the same rejection.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AuthError, AuthRejection};
use crate::jwt::JwtManager;
use crate::password::verify_password_blocking;
use crate::rules::LoginRequest;
use crate::store::CredentialStore;
use crate::validation::validated;

/// Orchestrates credential checks and token issuance
#[derive(Clone)]
pub struct LoginFlow {
    store: Arc<dyn CredentialStore>,
    jwt: Arc<JwtManager>,
}

impl LoginFlow {
    pub fn new(store: Arc<dyn CredentialStore>, jwt: Arc<JwtManager>) -> Self {
        Self { store, jwt }
    }

    /// Run the flow, returning a signed token on success
    pub async fn login(&self, request: LoginRequest) -> Result<String, AuthRejection> {
        let result = self.authenticate(request).await;

        match result {
            Ok((username, token)) => {
                metrics::counter!("contactbook_login_total", "outcome" => "success").increment(1);
                info!("User {} logged in successfully", username);
                Ok(token)
            }
            Err(cause) => {
                warn!("Login rejected: {}", cause);
                let rejection = cause.into_login_rejection();
                metrics::counter!("contactbook_login_total", "outcome" => rejection.outcome())
                    .increment(1);
                Err(rejection)
            }
        }
    }

    async fn authenticate(&self, request: LoginRequest) -> Result<(String, String), AuthError> {
        let request = validated(request).map_err(AuthError::Validation)?;
        let username = request.username.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        debug!("Login attempt for user: {}", username);

        let principal = self
            .store
            .find_principal_by_username(&username)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !verify_password_blocking(password, principal.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.generate_token(&principal.username)?;
        Ok((principal.username, token))
    }
}
