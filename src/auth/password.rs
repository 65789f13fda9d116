use crate::error::AppResult;

/// Hash a plaintext password with bcrypt. Runs before any user row is
/// persisted so the plaintext never reaches the database.
pub fn hash_password(plain: &str, cost: u32) -> AppResult<String> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Verify a candidate plaintext against a stored bcrypt hash.
/// Any hash-parse failure counts as a mismatch.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plain, stored_hash).unwrap_or(false)
}
