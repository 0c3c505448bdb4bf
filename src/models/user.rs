use serde::Serialize;
use sqlx::FromRow;

use crate::{db::DbPool, error::AppError};

/// Stored shape of a user. Deliberately not `Serialize`: the password hash
/// must never leave the process.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserOutput {
    pub id: i64,
    pub username: String,
}

impl User {
    pub async fn find_by_username(
        pool: &DbPool,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM user WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn create(
        pool: &DbPool,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO user (username, password_hash) VALUES (?, ?) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub fn verify_password(&self, password: &str) -> bool {
        crate::auth::verify_password(password, &self.password_hash)
    }

    pub fn to_output(&self) -> UserOutput {
        UserOutput {
            id: self.id,
            username: self.username.clone(),
        }
    }
}
