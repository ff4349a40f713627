//! Persistence contracts
//!
//! The core never talks to a database directly. Storage backends implement
//! these traits; `flipstock-engine` provides the on-disk one and
//! [`MemoryStore`] an in-process one.

use crate::{ContentHash, Handle, Identity, IdentityId, Product, ProductId, Result};

pub mod memory;

pub use memory::MemoryStore;

/// Identity persistence.
///
/// `insert_identity` must enforce handle uniqueness atomically: of any number
/// of concurrent inserts with the same handle exactly one succeeds and the
/// rest fail with `DuplicateHandle`.
pub trait IdentityStore: Send + Sync {
    fn find_identity_by_handle(&self, handle: &Handle) -> Result<Option<Identity>>;

    fn find_identity_by_id(&self, id: &IdentityId) -> Result<Option<Identity>>;

    fn insert_identity(&self, identity: &Identity) -> Result<()>;
}

/// Product persistence. No ownership checks happen at this layer.
pub trait ProductStore: Send + Sync {
    fn find_product_by_id(&self, id: &ProductId) -> Result<Option<Product>>;

    /// All products of one owner, oldest first
    fn list_products_by_owner(&self, owner: &IdentityId) -> Result<Vec<Product>>;

    /// Insert or replace
    fn save_product(&self, product: &Product) -> Result<()>;

    /// Removing a missing product is not an error
    fn delete_product(&self, id: &ProductId) -> Result<()>;
}

/// Content-addressed, reference-counted byte storage for product images
pub trait BlobStore: Send + Sync {
    /// Store bytes (or take another reference to identical bytes)
    fn put_blob(&self, data: &[u8]) -> Result<ContentHash>;

    fn get_blob(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>>;

    /// Drop one reference; the bytes go away with the last one
    fn release_blob(&self, hash: &ContentHash) -> Result<()>;
}
