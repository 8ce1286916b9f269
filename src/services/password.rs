//! Argon2id password hashing.
//!
//! An explicitly constructed, stateless service owned by the auth service,
//! not a module-level singleton. Parameters come from [`SecurityConfig`].

use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use tokio::task;

use crate::config::SecurityConfig;

#[derive(Clone)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    pub fn new(config: &SecurityConfig) -> Result<Self> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        Ok(Self { params })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a caller-provided salt. The salt is an identifier
    /// issued against the salt ledger; its bytes are b64-encoded into the
    /// form the hash primitive expects.
    ///
    /// Runs under `spawn_blocking`: Argon2 is CPU-bound and would stall the
    /// async runtime if run inline.
    pub async fn hash(&self, password: &str, salt: &str) -> Result<String> {
        let argon2 = self.hasher();
        let password = password.to_string();
        let salt = SaltString::encode_b64(salt.as_bytes())
            .map_err(|e| anyhow::anyhow!("Failed to encode salt: {e}"))?;

        task::spawn_blocking(move || {
            let hash = argon2
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
            Ok::<String, anyhow::Error>(hash.to_string())
        })
        .await
        .context("Password hashing task panicked")?
    }

    /// Verify a password against a stored PHC hash string. The salt and
    /// parameters are embedded in the hash itself.
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")?
    }
}
