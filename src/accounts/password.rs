use tracing::error;

/// Hash a plaintext password with bcrypt at the given cost. The salt is
/// generated per call inside the bcrypt crate.
pub fn hash_password(plain: &str, cost: u32) -> anyhow::Result<String> {
    bcrypt::hash(plain, cost).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::anyhow!(e.to_string())
    })
}

/// Compare a plaintext candidate against a stored bcrypt hash. Errors only
/// on a malformed hash; a mismatch is `Ok(false)`.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    bcrypt::verify(plain, hash).map_err(|e| {
        error!(error = %e, "bcrypt verify error");
        anyhow::anyhow!(e.to_string())
    })
}
