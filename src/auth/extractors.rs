use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::errors::{ApiError, CredentialError};

/// Extracts and validates the bearer token, returning the user ID.
///
/// The user record is not loaded here; handlers decide what a missing or
/// deactivated user means for them.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts.headers.get(AUTHORIZATION)).map_err(|e| {
            warn!(reason = %e, "rejected credential");
            e
        })?;
        let claims = JwtKeys::from_ref(state).verify(token)?;
        Ok(AuthUser(claims.sub))
    }
}

/// Pulls the token out of an `Authorization` value; the `Bearer ` prefix is optional.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, CredentialError> {
    let raw = header.ok_or(CredentialError::Missing)?;
    let raw = raw.to_str().map_err(|_| CredentialError::Malformed)?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err(CredentialError::Malformed);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header() {
        assert_eq!(bearer_token(None), Err(CredentialError::Missing));
    }

    #[test]
    fn empty_after_prefix_is_malformed() {
        let empty = HeaderValue::from_static("");
        let bare = HeaderValue::from_static("Bearer ");
        let spaces = HeaderValue::from_static("Bearer    ");
        assert_eq!(bearer_token(Some(&empty)), Err(CredentialError::Malformed));
        assert_eq!(bearer_token(Some(&bare)), Err(CredentialError::Malformed));
        assert_eq!(bearer_token(Some(&spaces)), Err(CredentialError::Malformed));
    }

    #[test]
    fn prefix_is_optional() {
        let prefixed = HeaderValue::from_static("Bearer abc.def.ghi");
        let raw = HeaderValue::from_static("abc.def.ghi");
        assert_eq!(bearer_token(Some(&prefixed)), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(Some(&raw)), Ok("abc.def.ghi"));
    }

    #[test]
    fn non_text_header_is_malformed() {
        let bytes = HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap();
        assert_eq!(bearer_token(Some(&bytes)), Err(CredentialError::Malformed));
    }
}
