//! Identity resolution from bearer tokens

use std::sync::Arc;
use tracing::debug;

use super::token::TokenCodec;
use crate::store::IdentityStore;
use crate::{FlipstockError, Identity, Result};

/// Turns a raw bearer token into the identity it was issued to.
///
/// Every protected operation goes through [`IdentityResolver::resolve`]
/// before it touches owned data.
pub struct IdentityResolver<S> {
    codec: TokenCodec,
    store: Arc<S>,
}

impl<S> Clone for IdentityResolver<S> {
    fn clone(&self) -> Self {
        IdentityResolver {
            codec: self.codec.clone(),
            store: self.store.clone(),
        }
    }
}

impl<S: IdentityStore> IdentityResolver<S> {
    pub fn new(codec: TokenCodec, store: Arc<S>) -> Self {
        IdentityResolver { codec, store }
    }

    /// Resolve a token to a live identity.
    ///
    /// A bad token and a token for a deleted identity both yield
    /// `Unauthenticated`. Storage faults propagate unchanged.
    pub fn resolve(&self, token: &str) -> Result<Identity> {
        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(FlipstockError::InvalidToken) => return Err(FlipstockError::Unauthenticated),
            Err(e) => return Err(e),
        };

        match self.store.find_identity_by_id(&claims.identity_id)? {
            Some(identity) => Ok(identity),
            None => {
                debug!(identity = %claims.identity_id, "token refers to a missing identity");
                Err(FlipstockError::Unauthenticated)
            }
        }
    }
}
