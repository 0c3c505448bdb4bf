use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::{
    db::DbPool,
    error::AppError,
    models::user::{User, UserOutput},
};

/// Hashes a password into a PHC string; the scheme identifier and salt travel
/// with the hash.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Other(anyhow::anyhow!("password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub async fn create_user(pool: &DbPool, username: &str, password: &str) -> Result<User, AppError> {
    let password_hash = hash_password(password)?;
    User::create(pool, username, &password_hash).await
}

/// Checks username + password. Unknown user and wrong password are not
/// distinguished in the error.
pub async fn authenticate_user(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    match User::find_by_username(pool, username).await? {
        Some(user) if user.verify_password(password) => Ok(user),
        _ => {
            debug!(username, "login rejected");
            Err(AppError::Unauthorized)
        }
    }
}

/// Resolves a bearer token to a user. The token is the literal username: no
/// expiry, no signature. Fine for a demo system, nothing else.
pub async fn resolve_token(pool: &DbPool, token: &str) -> Result<UserOutput, AppError> {
    User::find_by_username(pool, token)
        .await?
        .map(|user| user.to_output())
        .ok_or(AppError::Unauthorized)
}

/// The authenticated caller, extracted from the `Authorization: Bearer`
/// header. Rejects with 401 when the header is missing or the token does not
/// name a known user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserOutput);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;
        let pool = DbPool::from_ref(state);
        let user = resolve_token(&pool, bearer.token()).await?;
        Ok(Self(user))
    }
}
