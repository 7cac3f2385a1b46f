use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Work factor carried over from the original deployment. Tunable via
/// `HASH_COST`; verification reads whatever params a stored hash embeds.
pub const DEFAULT_HASH_COST: u32 = 10;

fn hasher(cost: u32) -> anyhow::Result<Argon2<'static>> {
    let params = Params::new(Params::DEFAULT_M_COST, cost, Params::DEFAULT_P_COST, None)
        .map_err(|e| {
            error!(error = %e, cost, "invalid argon2 params");
            anyhow::anyhow!(e.to_string())
        })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(plain: &str, cost: u32) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(cost)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
