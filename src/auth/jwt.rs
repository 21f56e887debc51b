use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::claims::Claims;
use crate::{
    config::{JwtConfig, MAX_JWT_TTL_MINUTES},
    errors::{ApiError, CredentialError},
    state::AppState,
};

/// HS256 signing and verification keys with the claims they are bound to.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let ttl_minutes = cfg.ttl_minutes.clamp(0, MAX_JWT_TTL_MINUTES) as u64;
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(ttl_minutes * 60),
        }
    }

    /// Issues a token for `user_id` that expires after the configured TTL.
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        self.sign_window(user_id, now, exp)
    }

    pub(crate) fn sign_window(
        &self,
        user_id: Uuid,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id,
            iat: issued_at.unix_timestamp().max(0) as usize,
            exp: expires_at.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Checks signature, issuer, audience and expiry. Expiry has no leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(classify)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

fn classify(e: jsonwebtoken::errors::Error) -> ApiError {
    match e.kind() {
        ErrorKind::ExpiredSignature => {
            warn!("expired token");
            CredentialError::Expired.into()
        }
        ErrorKind::InvalidKeyFormat
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::InvalidEcdsaKey
        | ErrorKind::RsaFailedSigning
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm
        | ErrorKind::Crypto(_) => {
            error!(error = %e, "token verification failed internally");
            ApiError::Internal(anyhow::anyhow!("token verification: {e}"))
        }
        _ => {
            warn!(error = %e, "invalid token");
            CredentialError::Invalid.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
        })
    }

    fn credential_kind(err: ApiError) -> CredentialError {
        match err {
            ApiError::Credential(kind) => kind,
            other => panic!("expected credential error, got {other:?}"),
        }
    }

    #[test]
    fn sign_and_verify() {
        let keys = keys("dev-secret", "test-issuer", "test-aud");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn oversized_ttl_is_capped() {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: i64::MAX,
        });
        let claims = keys.verify(&keys.sign(Uuid::new_v4()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, (MAX_JWT_TTL_MINUTES * 60) as usize);
    }

    #[test]
    fn expired_token_with_right_secret_is_expired() {
        let keys = keys("dev-secret", "iss", "aud");
        let now = OffsetDateTime::now_utc();
        let token = keys
            .sign_window(Uuid::new_v4(), now - TimeDuration::hours(2), now - TimeDuration::hours(1))
            .unwrap();
        let err = keys.verify(&token).unwrap_err();
        assert_eq!(credential_kind(err), CredentialError::Expired);
    }

    #[test]
    fn foreign_secret_is_invalid_even_when_expired() {
        let ours = keys("our-secret", "iss", "aud");
        let theirs = keys("their-secret", "iss", "aud");
        let now = OffsetDateTime::now_utc();

        let fresh = theirs.sign(Uuid::new_v4()).unwrap();
        assert_eq!(credential_kind(ours.verify(&fresh).unwrap_err()), CredentialError::Invalid);

        let stale = theirs
            .sign_window(Uuid::new_v4(), now - TimeDuration::hours(2), now - TimeDuration::hours(1))
            .unwrap();
        assert_eq!(credential_kind(ours.verify(&stale).unwrap_err()), CredentialError::Invalid);
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let keys = keys("dev-secret", "iss", "aud");
        let token = keys.sign(Uuid::new_v4()).unwrap();
        let other = keys.sign(Uuid::new_v4()).unwrap();
        // Splice another token's payload under the original signature.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert_eq!(credential_kind(keys.verify(&forged).unwrap_err()), CredentialError::Invalid);
    }

    #[test]
    fn garbage_and_wrong_audience_are_invalid() {
        let good = keys("same-secret", "good-iss", "good-aud");
        let bad = keys("same-secret", "bad-iss", "bad-aud");
        assert_eq!(credential_kind(good.verify("not.a.jwt").unwrap_err()), CredentialError::Invalid);

        let token = good.sign(Uuid::new_v4()).unwrap();
        assert_eq!(credential_kind(bad.verify(&token).unwrap_err()), CredentialError::Invalid);
    }
}
