//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contactbook_auth::messages::SERVER_ERROR;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] contactbook_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] contactbook_auth::AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Database(contactbook_db::DbError::Duplicate(field)) => (
                StatusCode::CONFLICT,
                contactbook_db::DbError::Duplicate(field).to_string(),
            ),
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_string())
            }
        };

        (status, axum::Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactbook_db::DbError;

    async fn render(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let (status, body) = render(DbError::Duplicate("username".to_string()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "message": "username already exists in the database" }));
    }

    #[tokio::test]
    async fn test_database_failure_hides_detail() {
        let db = contactbook_db::Database::in_memory().await.unwrap();
        db.close().await;
        let failure = db.has_users().await.unwrap_err();
        assert!(matches!(failure, DbError::Connection(_)));

        let (status, body) = render(failure.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let (status, body) = render(ApiError::NotFound("User was not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User was not found");
    }
}
