//! User operations

use chrono::Utc;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewUser, User, UserRole, UserUpdate};
use crate::repository::Database;
use crate::utils::normalize_email;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Usernames and emails are unique; a clash is reported as
    /// [`DbError::Duplicate`] naming the offending field.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();
        let email = normalize_email(&user.email);

        if self.get_user_by_username(&user.username).await?.is_some() {
            return Err(DbError::Duplicate("username".to_string()));
        }
        if self.get_user_by_email(&email).await?.is_some() {
            return Err(DbError::Duplicate("email".to_string()));
        }

        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(DbError::from_write)?;

        debug!("Inserted user {} ({})", user.username, id);

        Ok(User {
            id,
            username: user.username,
            email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Update the username, email or password hash of a user
    ///
    /// Fails with [`DbError::NotFound`] for an unknown id and with
    /// [`DbError::Duplicate`] when another user already holds the new
    /// username or email. `updated_at` is bumped even if nothing changed.
    pub async fn update_user(&self, id: &str, changes: UserUpdate) -> Result<User, DbError> {
        let current = self
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("user {}", id)))?;

        let email = changes.email.as_deref().map(normalize_email);

        if let Some(username) = &changes.username
            && let Some(holder) = self.get_user_by_username(username).await?
            && holder.id != current.id
        {
            return Err(DbError::Duplicate("username".to_string()));
        }
        if let Some(email) = &email
            && let Some(holder) = self.get_user_by_email(email).await?
            && holder.id != current.id
        {
            return Err(DbError::Duplicate("email".to_string()));
        }

        let updated = User {
            username: changes.username.unwrap_or(current.username),
            email: email.unwrap_or(current.email),
            password_hash: changes.password_hash.unwrap_or(current.password_hash),
            updated_at: Utc::now(),
            ..current
        };

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, password_hash = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&updated.username)
        .bind(&updated.email)
        .bind(&updated.password_hash)
        .bind(updated.updated_at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(DbError::from_write)?;

        // Deleted between the lookup and the write
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("user {}", id)));
        }

        debug!("Updated user {} ({})", updated.username, id);
        Ok(updated)
    }

    /// List all users holding a role
    pub async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE role = ?
            ORDER BY username
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Delete a user
    pub async fn delete_user(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if any users exist
    pub async fn has_users(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str, role: UserRole) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_user() {
        let db = Database::in_memory().await.unwrap();
        assert!(!db.has_users().await.unwrap());

        let user = db
            .insert_user(new_user("newUser", "Random@Mail.com", UserRole::User))
            .await
            .unwrap();
        assert_eq!(user.email, "random@mail.com");
        assert!(Uuid::parse_str(&user.id).is_ok());
        assert!(db.has_users().await.unwrap());

        let by_name = db.get_user_by_username("newUser").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_name.role, UserRole::User);

        let by_email = db.get_user_by_email("RANDOM@mail.com").await.unwrap().unwrap();
        assert_eq!(by_email.username, "newUser");

        let by_id = db.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.get_user_by_username("ghost").await.unwrap().is_none());
        assert!(db.get_user_by_email("ghost@mail.com").await.unwrap().is_none());
        assert!(!db.delete_user("not-an-id").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let db = Database::in_memory().await.unwrap();
        db.insert_user(new_user("newUser", "random@mail.com", UserRole::User))
            .await
            .unwrap();

        let err = db
            .insert_user(new_user("newUser", "other@mail.com", UserRole::User))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(ref field) if field == "username"));

        let err = db
            .insert_user(new_user("otherUser", "random@mail.com", UserRole::User))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "email already exists in the database");
    }

    #[tokio::test]
    async fn test_concurrent_inserts_report_duplicate() {
        let db = Database::in_memory().await.unwrap();

        let (first, second) = tokio::join!(
            db.insert_user(new_user("newUser", "a@mail.com", UserRole::User)),
            db.insert_user(new_user("newUser", "b@mail.com", UserRole::User)),
        );

        let (ok, err) = match (first, second) {
            (Ok(user), Err(err)) | (Err(err), Ok(user)) => (user, err),
            other => panic!("expected exactly one insert to win, got {other:?}"),
        };
        assert_eq!(ok.username, "newUser");
        assert!(matches!(err, DbError::Duplicate(ref field) if field == "username"));
    }

    #[tokio::test]
    async fn test_unique_violation_names_the_column() {
        let db = Database::in_memory().await.unwrap();
        db.insert_user(new_user("newUser", "random@mail.com", UserRole::User))
            .await
            .unwrap();

        // Bypass the pre-insert checks so that only the constraint fires.
        let err = sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
             VALUES ('x', 'otherUser', 'random@mail.com', 'h', 'User', '', '')",
        )
        .execute(&db.pool)
        .await
        .unwrap_err();
        assert!(matches!(DbError::from_write(err), DbError::Duplicate(ref f) if f == "email"));
    }

    #[tokio::test]
    async fn test_update_user() {
        let db = Database::in_memory().await.unwrap();
        let user = db
            .insert_user(new_user("newUser", "random@mail.com", UserRole::User))
            .await
            .unwrap();

        let updated = db
            .update_user(
                &user.id,
                UserUpdate {
                    email: Some("Changed@Mail.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "newUser");
        assert_eq!(updated.email, "changed@mail.com");
        assert_eq!(updated.password_hash, user.password_hash);
        assert!(updated.updated_at >= user.updated_at);

        let stored = db.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "changed@mail.com");
        assert!(db.get_user_by_email("random@mail.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_own_values_and_rejects_others() {
        let db = Database::in_memory().await.unwrap();
        let user = db
            .insert_user(new_user("newUser", "random@mail.com", UserRole::User))
            .await
            .unwrap();
        db.insert_user(new_user("otherUser", "other@mail.com", UserRole::User))
            .await
            .unwrap();

        let same = UserUpdate {
            username: Some("newUser".to_string()),
            email: Some("random@mail.com".to_string()),
            password_hash: None,
        };
        assert!(db.update_user(&user.id, same).await.is_ok());

        let taken = UserUpdate {
            username: Some("otherUser".to_string()),
            ..Default::default()
        };
        let err = db.update_user(&user.id, taken).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(ref field) if field == "username"));

        let taken = UserUpdate {
            email: Some("other@mail.com".to_string()),
            ..Default::default()
        };
        let err = db.update_user(&user.id, taken).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(ref field) if field == "email"));
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_not_found() {
        let db = Database::in_memory().await.unwrap();
        let err = db
            .update_user(&Uuid::new_v4().to_string(), UserUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_role_and_delete() {
        let db = Database::in_memory().await.unwrap();
        let admin = db
            .insert_user(new_user("rootUser", "root@mail.com", UserRole::Admin))
            .await
            .unwrap();
        db.insert_user(new_user("bobby", "bob@mail.com", UserRole::User))
            .await
            .unwrap();
        db.insert_user(new_user("alice", "alice@mail.com", UserRole::User))
            .await
            .unwrap();

        let users = db.list_users_by_role(UserRole::User).await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bobby"]);

        assert!(db.delete_user(&admin.id).await.unwrap());
        assert!(db.list_users_by_role(UserRole::Admin).await.unwrap().is_empty());
        assert!(!db.delete_user(&admin.id).await.unwrap());
    }
}
