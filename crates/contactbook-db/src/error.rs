//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("{0} already exists in the database")]
    Duplicate(String),
}

impl DbError {
    /// Turn a UNIQUE violation on the users table into [`DbError::Duplicate`]
    ///
    /// The pre-insert checks can race a concurrent writer, in which case the
    /// constraint is the only thing that notices.
    pub(crate) fn from_write(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error()
            && db_err.is_unique_violation()
        {
            let field = if db_err.message().contains("users.email") {
                "email"
            } else {
                "username"
            };
            return DbError::Duplicate(field.to_string());
        }
        DbError::Connection(e)
    }
}
