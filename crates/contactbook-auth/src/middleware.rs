//! Access gate middleware for Axum
//!
//! Protected routes pass through two stages, in this order:
//!
//! 1. [`verify_token`] validates the `Authorization` header, verifies the
//!    bearer token and attaches the [`AuthenticatedUser`] it names.
//! 2. [`confirm_principal`] looks that user up again in the credential
//!    store, so a principal deleted after login loses access at once even
//!    though its token is still valid.

use axum::{
    Router,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{AuthError, AuthRejection};
use crate::jwt::JwtManager;
use crate::rules::AuthorizationHeader;
use crate::store::CredentialStore;
use crate::validation::validated;

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthRejection::AuthorizationFailed)
    }
}

/// Shared state of both gate stages
#[derive(Clone)]
pub struct AccessGate {
    jwt: Arc<JwtManager>,
    store: Arc<dyn CredentialStore>,
}

impl AccessGate {
    pub fn new(jwt: Arc<JwtManager>, store: Arc<dyn CredentialStore>) -> Self {
        Self { jwt, store }
    }

    /// Guard every route of `router` with both stages
    ///
    /// The layer added last runs first, so token verification always
    /// wraps principal confirmation.
    pub fn protect<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .route_layer(middleware::from_fn_with_state(
                self.clone(),
                confirm_principal,
            ))
            .route_layer(middleware::from_fn_with_state(self.clone(), verify_token))
    }

    fn reject(&self, stage: &'static str, cause: AuthError) -> AuthRejection {
        warn!("Access gate ({}) rejected request: {}", stage, cause);
        let rejection = cause.into_access_rejection();
        metrics::counter!(
            "contactbook_access_gate_total",
            "stage" => stage,
            "outcome" => rejection.outcome()
        )
        .increment(1);
        rejection
    }
}

/// Stage A: header rules, then token verification
pub async fn verify_token(
    State(gate): State<AccessGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let header = AuthorizationHeader::from_headers(request.headers());
    let header = validated(header)
        .map_err(|errors| gate.reject("verify_token", AuthError::Validation(errors)))?;

    let claims = gate
        .jwt
        .validate_token(header.token())
        .map_err(|cause| gate.reject("verify_token", cause))?;

    debug!("Verified token for user: {}", claims.username);

    request.extensions_mut().insert(AuthenticatedUser {
        username: claims.username,
    });

    Ok(next.run(request).await)
}

/// Stage B: the verified principal must still exist
pub async fn confirm_principal(
    State(gate): State<AccessGate>,
    request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| gate.reject("confirm_principal", AuthError::MissingContext))?;

    match gate.store.find_principal_by_username(&user.username).await {
        Ok(Some(_)) => {
            debug!("Confirmed principal: {}", user.username);
            metrics::counter!("contactbook_access_gate_total", "stage" => "confirm_principal", "outcome" => "granted")
                .increment(1);
            Ok(next.run(request).await)
        }
        Ok(None) => Err(gate.reject("confirm_principal", AuthError::PrincipalNotFound)),
        Err(cause) => Err(gate.reject("confirm_principal", cause)),
    }
}
