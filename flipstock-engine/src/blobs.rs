//! Content-addressed image blobs with reference counts

use flipstock_core::store::BlobStore;
use flipstock_core::*;

use crate::{storage_err, StorageEngine};

impl StorageEngine {
    fn blob_key(hash: &ContentHash) -> String {
        format!("blob:{}", hash.to_hex())
    }

    fn blob_ref_key(hash: &ContentHash) -> String {
        format!("blobref:{}", hash.to_hex())
    }

    fn ref_count(&self, hash: &ContentHash) -> Result<Option<u32>> {
        let Some(raw) = self.blobs.get(Self::blob_ref_key(hash)).map_err(storage_err)? else {
            return Ok(None);
        };
        let bytes: [u8; 4] = raw[..].try_into().map_err(|_| {
            FlipstockError::Storage(format!("corrupt refcount for blob {}", hash.to_hex()))
        })?;
        Ok(Some(u32::from_le_bytes(bytes)))
    }

    /// Number of distinct blobs currently stored
    pub fn blob_count(&self) -> Result<usize> {
        let mut count = 0;
        for item in self.blobs.prefix("blobref:") {
            item.map_err(storage_err)?;
            count += 1;
        }
        Ok(count)
    }
}

impl BlobStore for StorageEngine {
    fn put_blob(&self, data: &[u8]) -> Result<ContentHash> {
        let hash = ContentHash::new(data);
        let _guard = self.lock_blobs()?;

        let mut batch = self.keyspace().batch();
        match self.ref_count(&hash)? {
            // Blob exists, take another reference
            Some(count) => {
                batch.insert(
                    &self.blobs,
                    Self::blob_ref_key(&hash),
                    (count + 1).to_le_bytes().to_vec(),
                );
            }
            None => {
                batch.insert(&self.blobs, Self::blob_key(&hash), data.to_vec());
                batch.insert(&self.blobs, Self::blob_ref_key(&hash), 1u32.to_le_bytes().to_vec());
            }
        }
        batch.commit().map_err(storage_err)?;
        self.persist()?;

        Ok(hash)
    }

    fn get_blob(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .get(Self::blob_key(hash))
            .map_err(storage_err)?
            .map(|data| data.to_vec()))
    }

    fn release_blob(&self, hash: &ContentHash) -> Result<()> {
        let _guard = self.lock_blobs()?;

        let mut batch = self.keyspace().batch();
        match self.ref_count(hash)? {
            Some(count) if count > 1 => {
                batch.insert(
                    &self.blobs,
                    Self::blob_ref_key(hash),
                    (count - 1).to_le_bytes().to_vec(),
                );
            }
            // Last reference, remove blob and refcount
            Some(_) => {
                batch.remove(&self.blobs, Self::blob_key(hash));
                batch.remove(&self.blobs, Self::blob_ref_key(hash));
            }
            None => return Ok(()),
        }
        batch.commit().map_err(storage_err)?;

        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_roundtrip() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        let hash = engine.put_blob(b"jpeg bytes").unwrap();

        assert_eq!(hash, ContentHash::new(b"jpeg bytes"));
        assert_eq!(engine.get_blob(&hash).unwrap().unwrap(), b"jpeg bytes");
        assert_eq!(engine.blob_count().unwrap(), 1);
    }

    #[test]
    fn test_shared_blob_survives_first_release() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        let hash = engine.put_blob(b"same").unwrap();
        engine.put_blob(b"same").unwrap();
        assert_eq!(engine.blob_count().unwrap(), 1);

        engine.release_blob(&hash).unwrap();
        assert!(engine.get_blob(&hash).unwrap().is_some());

        engine.release_blob(&hash).unwrap();
        assert!(engine.get_blob(&hash).unwrap().is_none());
        assert_eq!(engine.blob_count().unwrap(), 0);
    }

    #[test]
    fn test_release_unknown_blob_is_noop() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        engine.release_blob(&ContentHash::new(b"never stored")).unwrap();
    }
}
