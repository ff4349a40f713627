//! Password credential hashing
//!
//! Argon2id with a random per-hash salt and a process-wide secret key mixed
//! into every hash. Hashes are stored as PHC strings.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

use crate::config::HashCost;
use crate::{CredentialHash, FlipstockError, Result};

/// One-way hashing and verification of plaintext secrets
#[derive(Clone)]
pub struct CredentialHasher {
    secret: Vec<u8>,
    params: Params,
}

impl CredentialHasher {
    /// Create a hasher keyed with the process-wide password secret
    pub fn new(secret: &[u8], cost: HashCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| FlipstockError::Config(format!("hash cost: {}", e)))?;

        // Fail at startup rather than on the first signup
        Argon2::new_with_secret(secret, Algorithm::Argon2id, Version::V0x13, params.clone())
            .map_err(|e| FlipstockError::Config(format!("password secret: {}", e)))?;

        Ok(CredentialHasher {
            secret: secret.to_vec(),
            params,
        })
    }

    fn argon2(&self) -> Result<Argon2<'_>> {
        Argon2::new_with_secret(
            &self.secret,
            Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
        .map_err(|e| FlipstockError::Internal(e.to_string()))
    }

    /// Hash a plaintext secret. Two calls on the same input differ (fresh salt).
    pub fn hash(&self, plaintext: &str) -> Result<CredentialHash> {
        let mut salt_bytes = [0u8; 16];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| FlipstockError::Internal(e.to_string()))?;

        let phc = self
            .argon2()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| FlipstockError::Internal(e.to_string()))?
            .to_string();

        Ok(CredentialHash::from_phc(phc))
    }

    /// Check a plaintext secret against a stored hash.
    ///
    /// Any malformed hash is a mismatch.
    pub fn verify(&self, plaintext: &str, hash: &CredentialHash) -> bool {
        let Ok(parsed) = PasswordHash::new(hash.as_str()) else {
            return false;
        };
        match self.argon2() {
            Ok(argon2) => argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
