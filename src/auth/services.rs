use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{AuthData, LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_dummy, verify_password},
};
use crate::{
    errors::ApiError,
    users::{
        model::{NewUser, User},
        repo::UserStore,
        validation::Violations,
    },
};

/// Validates the registration, creates the user and issues a token.
pub async fn register(
    store: &dyn UserStore,
    keys: &JwtKeys,
    payload: RegisterRequest,
) -> Result<AuthData, ApiError> {
    let mut v = Violations::default();
    let email = v.email("email", payload.email.as_deref());
    v.password("password", payload.password.as_deref());
    let profile = payload.profile.unwrap_or_default().check(&mut v);
    v.into_result(()).map_err(|errors| {
        warn!(count = errors.len(), "registration failed validation");
        ApiError::Validation(errors)
    })?;

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = hash_password(payload.password.as_deref().unwrap_or_default())?;
    // The unique index still guards against a concurrent registration.
    let user = store
        .create(NewUser {
            email,
            password_hash,
            profile,
        })
        .await?;

    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(AuthData { user, token })
}

/// Checks the credentials, stamps `lastLogin` and issues a token.
///
/// Unknown email and wrong password produce the same error.
pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> Result<AuthData, ApiError> {
    let mut v = Violations::default();
    let email = v.email("email", payload.email.as_deref());
    let password = payload.password.unwrap_or_default();
    if password.is_empty() {
        v.push("password", "Password is required");
    }
    v.into_result(()).map_err(ApiError::Validation)?;

    let Some(user) = store.find_by_email(&email).await? else {
        verify_dummy(&password);
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login on deactivated account");
        return Err(ApiError::AccountDeactivated);
    }

    let user = store
        .record_login(user.id, OffsetDateTime::now_utc())
        .await?
        .ok_or(ApiError::NotFound)?;

    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(AuthData { user, token })
}

/// Resolves the identity behind a verified token to an active user.
pub async fn current_user(store: &dyn UserStore, user_id: Uuid) -> Result<User, ApiError> {
    let user = store.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(%user_id, "token for missing user");
        ApiError::NotFound
    })?;
    if !user.is_active {
        warn!(%user_id, "token for deactivated account");
        return Err(ApiError::AccountDeactivated);
    }
    Ok(user)
}
