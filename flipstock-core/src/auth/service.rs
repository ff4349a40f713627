//! Signup and signin

use std::sync::Arc;
use tracing::{debug, info};

use super::hasher::CredentialHasher;
use super::token::{SessionToken, TokenCodec};
use crate::config::AuthConfig;
use crate::store::IdentityStore;
use crate::{CredentialHash, FlipstockError, Handle, Identity, Result};
use secrecy::ExposeSecret;

/// Orchestrates the anonymous -> authenticated transition
pub struct AuthService<S> {
    hasher: CredentialHasher,
    codec: TokenCodec,
    store: Arc<S>,
    // Verified against when the handle is unknown so both signin failures cost the same
    decoy: CredentialHash,
}

impl<S> Clone for AuthService<S> {
    fn clone(&self) -> Self {
        AuthService {
            hasher: self.hasher.clone(),
            codec: self.codec.clone(),
            store: self.store.clone(),
            decoy: self.decoy.clone(),
        }
    }
}

impl<S: IdentityStore> AuthService<S> {
    pub fn new(hasher: CredentialHasher, codec: TokenCodec, store: Arc<S>) -> Result<Self> {
        let decoy = hasher.hash("flipstock decoy credential")?;
        Ok(AuthService {
            hasher,
            codec,
            store,
            decoy,
        })
    }

    pub fn from_config(config: &AuthConfig, store: Arc<S>) -> Result<Self> {
        config.validate()?;
        let hasher = CredentialHasher::new(
            config.password_secret.expose_secret().as_bytes(),
            config.hash_cost,
        )?;
        let codec = TokenCodec::from_config(config)?;
        Self::new(hasher, codec, store)
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create an identity.
    ///
    /// Fails with `DuplicateHandle` if the handle is taken. Uniqueness is
    /// left to the store's atomic insert; there is no pre-check here.
    pub fn signup(&self, handle: &str, secret: &str) -> Result<Identity> {
        let handle = Handle::new(handle)?;
        if secret.is_empty() {
            return Err(FlipstockError::InvalidInput("empty password".to_string()));
        }

        let credential = self.hasher.hash(secret)?;
        let identity = Identity::new(handle, credential);
        self.store.insert_identity(&identity)?;

        info!(identity = %identity.id, handle = %identity.handle, "identity created");
        Ok(identity)
    }

    /// Exchange a handle and secret for a session token.
    ///
    /// Unknown handle and wrong secret are the same `InvalidCredentials`.
    pub fn signin(&self, handle: &str, secret: &str) -> Result<SessionToken> {
        let found = match Handle::new(handle) {
            Ok(handle) => self.store.find_identity_by_handle(&handle)?,
            Err(_) => None,
        };

        let identity = match found {
            Some(identity) if self.hasher.verify(secret, &identity.credential) => identity,
            Some(identity) => {
                debug!(identity = %identity.id, "signin rejected: secret mismatch");
                return Err(FlipstockError::InvalidCredentials);
            }
            None => {
                let _ = self.hasher.verify(secret, &self.decoy);
                debug!("signin rejected: unknown handle");
                return Err(FlipstockError::InvalidCredentials);
            }
        };

        let token = self.codec.issue(&identity)?;
        info!(identity = %identity.id, "session issued");
        Ok(token)
    }
}
