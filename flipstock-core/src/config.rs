//! Process-wide auth configuration, read once at startup

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::{FlipstockError, Result};

/// Default session lifetime
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashCost {
    /// Cheapest parameters argon2 accepts. Tests only.
    pub const fn minimal() -> Self {
        HashCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for HashCost {
    fn default() -> Self {
        HashCost {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Secrets and policy consumed by the token codec and credential hasher.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub signing_secret: SecretString,
    pub password_secret: SecretString,
    pub token_ttl: Duration,
    pub hash_cost: HashCost,
}

impl AuthConfig {
    pub fn new(signing_secret: SecretString, password_secret: SecretString) -> Self {
        AuthConfig {
            signing_secret,
            password_secret,
            token_ttl: DEFAULT_TOKEN_TTL,
            hash_cost: HashCost::default(),
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Reject configurations the service cannot run safely with
    pub fn validate(&self) -> Result<()> {
        if self.signing_secret.expose_secret().is_empty() {
            return Err(FlipstockError::Config("signing secret is empty".to_string()));
        }
        if self.password_secret.expose_secret().is_empty() {
            return Err(FlipstockError::Config("password secret is empty".to_string()));
        }
        if self.token_ttl.as_secs() == 0 {
            return Err(FlipstockError::Config(
                "token ttl must be at least one second".to_string(),
            ));
        }
        argon2::Params::new(
            self.hash_cost.memory_kib,
            self.hash_cost.iterations,
            self.hash_cost.parallelism,
            None,
        )
        .map_err(|e| FlipstockError::Config(format!("hash cost: {}", e)))?;
        Ok(())
    }

    /// Fixed secrets and minimal hashing cost, for tests and benches
    pub fn for_testing() -> Self {
        AuthConfig::new(
            SecretString::from("test-signing-secret".to_string()),
            SecretString::from("test-password-secret".to_string()),
        )
        .with_hash_cost(HashCost::minimal())
    }
}
