//! Field validation pipeline
//!
//! Inputs describe their rules by implementing [`Validate`]. Rules are
//! chained per field and all of them are evaluated, so a response lists
//! every violated rule rather than the first one. [`validated`] is the
//! short-circuit step used before any business logic runs, and the
//! [`ValidatedJson`] / [`ValidatedQuery`] extractors apply it to request
//! bodies and query strings. [`LenientJson`] reads a body for callers that
//! run [`validated`] themselves.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use tracing::debug;

use crate::messages::BAD_REQUEST;

/// A single violated rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMessage {
    pub message: String,
}

impl FieldMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Ordered list of violated rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldMessage>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn push(&mut self, message: FieldMessage) {
        self.errors.push(message);
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn into_inner(self) -> Vec<FieldMessage> {
        self.errors
    }

    /// Start a rule chain for one field
    ///
    /// A missing value is checked as an empty string, so a missing field
    /// fails every rule an empty one would.
    pub fn field<'a>(&'a mut self, value: Option<&'a str>) -> FieldCheck<'a> {
        FieldCheck {
            value: value.unwrap_or(""),
            errors: self,
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "message": BAD_REQUEST,
            "errors": self.errors,
        }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

/// Rule chain over one field value
pub struct FieldCheck<'a> {
    value: &'a str,
    errors: &'a mut ValidationErrors,
}

impl FieldCheck<'_> {
    fn check(self, ok: bool, message: &str) -> Self {
        if !ok {
            self.errors.push(FieldMessage::new(message));
        }
        self
    }

    pub fn not_empty(self, message: &str) -> Self {
        let ok = !self.value.is_empty();
        self.check(ok, message)
    }

    pub fn min_length(self, min: usize, message: &str) -> Self {
        let ok = self.value.chars().count() >= min;
        self.check(ok, message)
    }

    pub fn max_length(self, max: usize, message: &str) -> Self {
        let ok = self.value.chars().count() <= max;
        self.check(ok, message)
    }

    pub fn matches(self, pattern: &Regex, message: &str) -> Self {
        let ok = pattern.is_match(self.value);
        self.check(ok, message)
    }

    pub fn satisfies(self, predicate: impl Fn(&str) -> bool, message: &str) -> Self {
        let ok = predicate(self.value);
        self.check(ok, message)
    }

    pub fn is_in(self, allowed: &[&str], message: &str) -> Self {
        let ok = allowed.contains(&self.value);
        self.check(ok, message)
    }
}

/// Input that knows its own field rules
pub trait Validate {
    fn validate(&self) -> ValidationErrors;
}

/// Run an input's rules, short-circuiting with every violation
pub fn validated<T: Validate>(input: T) -> Result<T, ValidationErrors> {
    let errors = input.validate();
    if errors.is_empty() {
        Ok(input)
    } else {
        Err(errors)
    }
}

/// JSON body extractor that never rejects
///
/// A body that cannot be parsed is replaced by `T::default()`, so that the
/// validation step that follows reports every missing field instead of a
/// bare parse error.
pub struct LenientJson<T>(pub T);

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(input)) => Ok(LenientJson(input)),
            Err(rejection) => {
                debug!("Unreadable request body: {}", rejection.body_text());
                Ok(LenientJson(T::default()))
            }
        }
    }
}

/// JSON body extractor that validates before the handler runs
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = ValidationErrors;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(LenientJson(input)) = LenientJson::<T>::from_request(req, state).await;
        validated(input).map(ValidatedJson)
    }
}

/// Query string extractor that validates before the handler runs
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = ValidationErrors;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let input = match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(input)) => input,
            Err(rejection) => {
                debug!("Unreadable query string: {}", rejection.body_text());
                T::default()
            }
        };

        validated(input).map(ValidatedQuery)
    }
}
