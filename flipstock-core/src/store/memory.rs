//! In-process store backed by hash maps

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{BlobStore, IdentityStore, ProductStore};
use crate::{
    ContentHash, FlipstockError, Handle, Identity, IdentityId, Product, ProductId, Result,
};

#[derive(Default)]
struct Identities {
    by_id: HashMap<IdentityId, Identity>,
    by_handle: HashMap<Handle, IdentityId>,
}

#[derive(Default)]
struct Blob {
    data: Vec<u8>,
    refs: u32,
}

/// Store that lives and dies with the process
#[derive(Default)]
pub struct MemoryStore {
    identities: RwLock<Identities>,
    products: RwLock<HashMap<ProductId, Product>>,
    blobs: RwLock<HashMap<ContentHash, Blob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an identity outright. Products it owned are left in place.
    pub fn remove_identity(&self, id: &IdentityId) -> Result<()> {
        let mut identities = write(&self.identities)?;
        if let Some(identity) = identities.by_id.remove(id) {
            identities.by_handle.remove(&identity.handle);
        }
        Ok(())
    }

    pub fn blob_count(&self) -> Result<usize> {
        Ok(read(&self.blobs)?.len())
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| FlipstockError::Storage("store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| FlipstockError::Storage("store lock poisoned".to_string()))
}

impl IdentityStore for MemoryStore {
    fn find_identity_by_handle(&self, handle: &Handle) -> Result<Option<Identity>> {
        let identities = read(&self.identities)?;
        Ok(identities
            .by_handle
            .get(handle)
            .and_then(|id| identities.by_id.get(id))
            .cloned())
    }

    fn find_identity_by_id(&self, id: &IdentityId) -> Result<Option<Identity>> {
        Ok(read(&self.identities)?.by_id.get(id).cloned())
    }

    fn insert_identity(&self, identity: &Identity) -> Result<()> {
        // Check and insert under one write guard
        let mut identities = write(&self.identities)?;
        if identities.by_handle.contains_key(&identity.handle) {
            return Err(FlipstockError::DuplicateHandle);
        }
        identities
            .by_handle
            .insert(identity.handle.clone(), identity.id);
        identities.by_id.insert(identity.id, identity.clone());
        Ok(())
    }
}

impl ProductStore for MemoryStore {
    fn find_product_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(read(&self.products)?.get(id).cloned())
    }

    fn list_products_by_owner(&self, owner: &IdentityId) -> Result<Vec<Product>> {
        use crate::Owned;

        let mut products: Vec<Product> = read(&self.products)?
            .values()
            .filter(|p| p.owner_id() == owner)
            .cloned()
            .collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    fn save_product(&self, product: &Product) -> Result<()> {
        write(&self.products)?.insert(product.id, product.clone());
        Ok(())
    }

    fn delete_product(&self, id: &ProductId) -> Result<()> {
        write(&self.products)?.remove(id);
        Ok(())
    }
}

impl BlobStore for MemoryStore {
    fn put_blob(&self, data: &[u8]) -> Result<ContentHash> {
        let hash = ContentHash::new(data);
        let mut blobs = write(&self.blobs)?;
        let blob = blobs.entry(hash.clone()).or_insert_with(|| Blob {
            data: data.to_vec(),
            refs: 0,
        });
        blob.refs += 1;
        Ok(hash)
    }

    fn get_blob(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>> {
        Ok(read(&self.blobs)?.get(hash).map(|b| b.data.clone()))
    }

    fn release_blob(&self, hash: &ContentHash) -> Result<()> {
        let mut blobs = write(&self.blobs)?;
        let remove = match blobs.get_mut(hash) {
            Some(blob) if blob.refs > 1 => {
                blob.refs -= 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if remove {
            blobs.remove(hash);
        }
        Ok(())
    }
}
