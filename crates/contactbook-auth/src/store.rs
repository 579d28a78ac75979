//! Credential store gateway

use async_trait::async_trait;
use contactbook_db::Database;
use tracing::error;

use crate::error::AuthError;

/// The slice of a stored user that authentication reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub password_hash: String,
}

/// Lookup of principals by username
///
/// `Ok(None)` means the principal does not exist. Any infrastructure
/// failure is reported as [`AuthError::Store`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_principal_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Principal>, AuthError>;
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_principal_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Principal>, AuthError> {
        let user = self.get_user_by_username(username).await.map_err(|e| {
            error!("Credential lookup for {} failed: {}", username, e);
            AuthError::Store(e.to_string())
        })?;

        Ok(user.map(|u| Principal {
            username: u.username,
            password_hash: u.password_hash,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactbook_db::{NewUser, UserRole};

    #[tokio::test]
    async fn test_database_resolves_principals() {
        let db = Database::in_memory().await.unwrap();
        db.insert_user(NewUser {
            username: "newUser".to_string(),
            email: "random@mail.com".to_string(),
            password_hash: "stored-hash".to_string(),
            role: UserRole::User,
        })
        .await
        .unwrap();

        let principal = db.find_principal_by_username("newUser").await.unwrap();
        assert_eq!(
            principal,
            Some(Principal {
                username: "newUser".to_string(),
                password_hash: "stored-hash".to_string(),
            })
        );

        assert_eq!(db.find_principal_by_username("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_closed_database_is_store_error() {
        let db = Database::in_memory().await.unwrap();
        db.close().await;

        let result = db.find_principal_by_username("newUser").await;
        assert!(matches!(result, Err(AuthError::Store(_))));
    }
}
