use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};

use crate::entities::session::{self, Entity as Session};
use crate::entities::user::{self, Entity as User};
use crate::error::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalServerError(format!("Password hash error: {}", e)))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::InternalServerError(format!("Hash parse error: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 32 random bytes, URL-safe base64. Used for session and CSRF tokens.
pub fn generate_token() -> String {
    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill(&mut random_bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub async fn find_user_by_name<C: ConnectionTrait>(
    db: &C,
    user_name: &str,
) -> Result<Option<user::Model>, AppError> {
    Ok(User::find()
        .filter(user::Column::UserName.eq(user_name))
        .one(db)
        .await?)
}

/// Looks the user up by name and checks the password. `None` covers both an
/// unknown user and a wrong password.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    user_name: &str,
    password: &str,
) -> Result<Option<user::Model>, AppError> {
    let Some(user) = find_user_by_name(db, user_name).await? else {
        tracing::debug!(user_name, "Unknown user");
        return Ok(None);
    };

    if verify_password(password, &user.password)? {
        Ok(Some(user))
    } else {
        tracing::debug!(user_name, "Password verification failed");
        Ok(None)
    }
}

pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    user_name: &str,
    email: &str,
    password: &str,
) -> Result<user::Model, AppError> {
    let password_hash = hash_password(password)?;

    let user = user::ActiveModel {
        user_name: Set(user_name.to_string()),
        email: Set(email.to_string()),
        password: Set(password_hash),
        ..Default::default()
    };

    let created = user
        .insert(db)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "User name or email already exists"))?;

    tracing::info!(user_id = created.id, user_name = %created.user_name, "User created");
    Ok(created)
}

pub async fn set_password<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
    new_password: &str,
) -> Result<user::Model, AppError> {
    let mut active_user: user::ActiveModel = user.into();
    active_user.password = Set(hash_password(new_password)?);
    Ok(active_user.update(db).await?)
}

/// Issues a session for the user. Only the token hash is stored; the raw
/// token is returned to hand to the client.
pub async fn create_session<C: ConnectionTrait>(
    db: &C,
    user: &user::Model,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let token = generate_token();
    let now = chrono::Utc::now().naive_utc();

    session::ActiveModel {
        user_id: Set(user.id),
        token_hash: Set(hash_token(&token)),
        expires_at: Set(now + chrono::Duration::hours(ttl_hours)),
        created_at: Set(now),
        revoked: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(token)
}

/// Resolves a raw token to its live session and user. Revoked, expired and
/// unknown tokens resolve to `None`.
pub async fn resolve_session<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<Option<(session::Model, user::Model)>, AppError> {
    let found = Session::find()
        .filter(session::Column::TokenHash.eq(hash_token(token)))
        .find_also_related(User)
        .one(db)
        .await?;

    let Some((session, Some(user))) = found else {
        return Ok(None);
    };

    if session.revoked || session.expires_at < chrono::Utc::now().naive_utc() {
        tracing::debug!(session_id = session.id, "Session revoked or expired");
        return Ok(None);
    }

    Ok(Some((session, user)))
}

pub async fn revoke_session<C: ConnectionTrait>(db: &C, session_id: i32) -> Result<(), AppError> {
    let session = Session::find_by_id(session_id)
        .one(db)
        .await?
        .ok_or(AppError::Unauthorized("Session not found".to_string()))?;

    let mut active_session: session::ActiveModel = session.into();
    active_session.revoked = Set(true);
    active_session.update(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password_accepts_only_the_hashed_password() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_generated_tokens_are_unique_and_cookie_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_hash_token_is_hex_sha256() {
        let hash = hash_token("token");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("token"));
    }
}
