//! Shared request-handling state

use flipstock_core::store::{BlobStore, IdentityStore, ProductStore};
use flipstock_core::{AuthConfig, AuthService, IdentityResolver, Inventory, Result};
use std::sync::Arc;

/// A backend the server can run on
pub trait Store: IdentityStore + ProductStore + BlobStore + 'static {}

impl<T: IdentityStore + ProductStore + BlobStore + 'static> Store for T {}

/// Services shared by every connection. Clones share the same store.
pub struct AppState<S> {
    pub auth: AuthService<S>,
    pub resolver: IdentityResolver<S>,
    pub inventory: Inventory<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            auth: self.auth.clone(),
            resolver: self.resolver.clone(),
            inventory: self.inventory.clone(),
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(config: &AuthConfig, store: Arc<S>) -> Result<Self> {
        let auth = AuthService::from_config(config, store.clone())?;
        let resolver = IdentityResolver::new(auth.codec().clone(), store.clone());
        let inventory = Inventory::new(store);

        Ok(AppState {
            auth,
            resolver,
            inventory,
        })
    }
}
