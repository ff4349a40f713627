//! Persistent storage for flipstock using fjall

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use flipstock_core::*;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub mod blobs;
pub mod identities;
pub mod products;

const IDENTITIES: &str = "identities";
const HANDLES: &str = "handles";
const PRODUCTS: &str = "products";
const OWNED: &str = "owned";
const BLOBS: &str = "blobs";

pub(crate) fn storage_err(e: impl std::fmt::Display) -> FlipstockError {
    FlipstockError::Storage(e.to_string())
}

/// Storage engine wrapping a fjall keyspace.
///
/// Cheap to clone; clones share the keyspace and the write locks.
#[derive(Clone)]
pub struct StorageEngine {
    keyspace: Arc<Keyspace>,
    pub(crate) identities: PartitionHandle,
    pub(crate) handles: PartitionHandle,
    pub(crate) products: PartitionHandle,
    pub(crate) owned: PartitionHandle,
    pub(crate) blobs: PartitionHandle,
    // Serializes the handle check-and-insert
    handle_lock: Arc<Mutex<()>>,
    // Serializes blob refcount read-modify-write
    blob_lock: Arc<Mutex<()>>,
}

impl StorageEngine {
    /// Open (or create) a store at the given path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let keyspace = Config::new(path).open().map_err(storage_err)?;

        let open = |name: &str| {
            keyspace
                .open_partition(name, PartitionCreateOptions::default())
                .map_err(storage_err)
        };
        let identities = open(IDENTITIES)?;
        let handles = open(HANDLES)?;
        let products = open(PRODUCTS)?;
        let owned = open(OWNED)?;
        let blobs = open(BLOBS)?;

        Ok(StorageEngine {
            keyspace: Arc::new(keyspace),
            identities,
            handles,
            products,
            owned,
            blobs,
            handle_lock: Arc::new(Mutex::new(())),
            blob_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create temporary storage engine for testing
    #[cfg(any(test, feature = "test-utils"))]
    pub fn temp() -> Result<(Self, tempfile::TempDir)> {
        let temp_dir = tempfile::tempdir().map_err(|e| FlipstockError::Internal(e.to_string()))?;
        let engine = Self::new(temp_dir.path())?;
        Ok((engine, temp_dir))
    }

    pub(crate) fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    pub(crate) fn lock_handles(&self) -> Result<MutexGuard<'_, ()>> {
        self.handle_lock
            .lock()
            .map_err(|_| FlipstockError::Storage("handle index lock poisoned".to_string()))
    }

    pub(crate) fn lock_blobs(&self) -> Result<MutexGuard<'_, ()>> {
        self.blob_lock
            .lock()
            .map_err(|_| FlipstockError::Storage("blob lock poisoned".to_string()))
    }

    /// Persist all changes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(storage_err)
    }
}
