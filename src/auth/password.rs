use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::AuthConfig;

/// Argon2id hashing with the configured work factor.
///
/// Both operations are CPU-bound and run on the blocking pool.
#[derive(Debug, Clone)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
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

    pub async fn hash(&self, password: &str) -> Result<String> {
        let argon2 = self.hasher();
        let password = password.to_string();

        task::spawn_blocking(move || hash_with(&argon2, &password))
            .await
            .context("Password hashing task panicked")?
    }

    /// `false` for a wrong password or an unparseable digest.
    pub async fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        let argon2 = self.hasher();
        let password = password.to_string();
        let digest = digest.to_string();

        task::spawn_blocking(move || {
            let Ok(parsed) = PasswordHash::new(&digest) else {
                tracing::warn!("Stored password hash is not a valid PHC string");
                return false;
            };
            argon2.verify_password(password.as_bytes(), &parsed).is_ok()
        })
        .await
        .context("Password verification task panicked")
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
