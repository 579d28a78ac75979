//! User routes
//!
//! Registration is open; every other route sits behind the access gate.
//! Lookups, updates and deletion are not restricted to the caller's own
//! record.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use contactbook_auth::{AccessGate, AuthenticatedUser, ValidatedJson, ValidatedQuery, hash_password};
use contactbook_db::{DbError, NewUser, UserUpdate};
use tracing::{debug, info};

use super::types::{
    DeleteUserRequest, EmailQuery, RegisterUserRequest, RoleQuery, USER_NOT_FOUND,
    USER_REGISTERED, USER_RETRIEVED, USER_UPDATED, USERS_NOT_FOUND, USERS_RETRIEVED,
    UpdateUserRequest, UserEnvelope, UserResponse, UsernameQuery, UsersEnvelope, parse_role,
};
use crate::error::ApiError;
use crate::state::AppState;

/// Hash off the async runtime
async fn hash_blocking(password: String) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(hash)
}

/// POST /users
async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    let password_hash = hash_blocking(request.password.unwrap_or_default()).await?;

    let user = state
        .db
        .insert_user(NewUser {
            username: request.username.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            password_hash,
            role: parse_role(request.role.as_deref()),
        })
        .await?;

    info!("Registered user {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: USER_REGISTERED,
            user: UserResponse::from(user),
        }),
    ))
}

/// GET /users/username?username=
async fn get_user_by_username(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<UsernameQuery>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let username = query.username.unwrap_or_default();
    debug!("{} looking up user {}", caller.username, username);

    let user = state
        .db
        .get_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(UserEnvelope {
        message: USER_RETRIEVED,
        user: user.into(),
    }))
}

/// GET /users/email?email=
async fn get_user_by_email(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<EmailQuery>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let email = query.email.unwrap_or_default();

    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(UserEnvelope {
        message: USER_RETRIEVED,
        user: user.into(),
    }))
}

/// GET /users/role?role=
async fn get_users_by_role(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<RoleQuery>,
) -> Result<Json<UsersEnvelope>, ApiError> {
    let role = parse_role(query.role.as_deref());
    let users = state.db.list_users_by_role(role).await?;

    if users.is_empty() {
        return Err(ApiError::NotFound(USERS_NOT_FOUND.to_string()));
    }

    Ok(Json(UsersEnvelope {
        message: USERS_RETRIEVED,
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// PUT /users
async fn update_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let id = request.id.unwrap_or_default();
    let password_hash = match request.password {
        Some(password) => Some(hash_blocking(password).await?),
        None => None,
    };

    let changes = UserUpdate {
        username: request.username,
        email: request.email,
        password_hash,
    };

    let user = state
        .db
        .update_user(&id, changes)
        .await
        .map_err(|e| match e {
            DbError::NotFound(_) => ApiError::NotFound(USER_NOT_FOUND.to_string()),
            other => ApiError::Database(other),
        })?;

    info!("User {} updated user {}", caller.username, id);

    Ok(Json(UserEnvelope {
        message: USER_UPDATED,
        user: user.into(),
    }))
}

/// DELETE /users
async fn delete_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<DeleteUserRequest>,
) -> Result<StatusCode, ApiError> {
    let id = request.id.unwrap_or_default();

    if !state.db.delete_user(&id).await? {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    info!("User {} deleted user {}", caller.username, id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes(gate: &AccessGate) -> Router<AppState> {
    let protected = Router::new()
        .route("/users", put(update_user).delete(delete_user))
        .route("/users/username", get(get_user_by_username))
        .route("/users/email", get(get_user_by_email))
        .route("/users/role", get(get_users_by_role));

    Router::new()
        .route("/users", post(register_user))
        .merge(gate.protect(protected))
}
