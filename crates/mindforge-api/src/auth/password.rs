//! bcrypt password hashing.
//!
//! bcrypt is CPU-bound, so both operations run on the blocking pool.

use mindforge_core::{defaults, Error, Result};

pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, defaults::BCRYPT_COST))
        .await
        .map_err(|e| Error::Internal(format!("hash task failed: {e}")))?
        .map_err(|e| Error::Internal(format!("Failed to hash password: {e}")))
}

/// Compare `password` against a stored hash. A malformed hash counts as a
/// mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Internal(format!("verify task failed: {e}")))?;
    Ok(verified.unwrap_or(false))
}
