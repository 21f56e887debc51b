use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

// Argon2id v19, m=19456 KiB, t=2, p=1. Changing these only affects new hashes;
// verification reads the parameters back out of the stored PHC string.
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

lazy_static! {
    // Throwaway hash with the live parameters, verified against when the
    // account does not exist.
    static ref DUMMY_HASH: Option<String> = hash_password("talentlink-no-such-user").ok();
}

/// Hashes `plain` with a fresh random salt into a PHC string.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on mismatch; `Err` only if the stored hash is unreadable.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(hasher().verify_password(plain.as_bytes(), &parsed).is_ok())
}

/// Burns one full verification for a login on an unknown account, so it takes
/// as long as a wrong password does.
pub fn verify_dummy(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}
