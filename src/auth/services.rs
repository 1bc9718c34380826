use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::jwt::JwtKeys;
use super::password::{hash_password, hash_password_blocking, verify_password_blocking};
use crate::error::{AppError, AppResult};
use crate::store::{Store, StoreError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

lazy_static! {
    /// Verified against on unknown emails so both login failures cost one Argon2 run.
    static ref DUMMY_HASH: String =
        hash_password("spendwise-no-such-user").unwrap_or_default();
}

/// Creates a user and returns its id. Email case is kept as given.
pub async fn register(store: &dyn Store, email: &str, password: &str) -> AppResult<i32> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }

    let hash = hash_password_blocking(password.to_owned()).await?;

    let user = store.create_user(email, &hash).await.map_err(|e| match e {
        StoreError::UniqueViolation => {
            warn!(email, "email already registered");
            AppError::DuplicateEmail
        }
        other => AppError::Store(other),
    })?;

    info!(user_id = user.id, "user registered");
    Ok(user.id)
}

/// Unknown email and wrong password end in the same `InvalidCredentials`.
pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> AppResult<String> {
    let Some(user) = store.find_user_by_email(email.trim()).await? else {
        let _ = verify_password_blocking(password.to_owned(), DUMMY_HASH.clone()).await;
        warn!("login for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let ok = verify_password_blocking(password.to_owned(), user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = user.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = keys.issue(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(token)
}

pub async fn delete_account(store: &dyn Store, user_id: i32) -> AppResult<()> {
    store.delete_user(user_id).await?;
    info!(user_id, "account deleted");
    Ok(())
}
