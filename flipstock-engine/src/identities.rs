//! Identity records and the unique handle index

use flipstock_core::store::IdentityStore;
use flipstock_core::*;
use tracing::warn;

use crate::{storage_err, StorageEngine};

impl StorageEngine {
    fn identity_by_key(&self, id: &str) -> Result<Option<Identity>> {
        match self.identities.get(id).map_err(storage_err)? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }
}

impl IdentityStore for StorageEngine {
    fn find_identity_by_handle(&self, handle: &Handle) -> Result<Option<Identity>> {
        let Some(id) = self.handles.get(handle.as_str()).map_err(storage_err)? else {
            return Ok(None);
        };

        let id = std::str::from_utf8(&id).map_err(storage_err)?;
        let identity = self.identity_by_key(id)?;
        if identity.is_none() {
            warn!(handle = %handle, "handle index points at a missing identity");
        }
        Ok(identity)
    }

    fn find_identity_by_id(&self, id: &IdentityId) -> Result<Option<Identity>> {
        self.identity_by_key(&id.to_string())
    }

    fn insert_identity(&self, identity: &Identity) -> Result<()> {
        let record = serde_json::to_vec(identity)?;
        let id = identity.id.to_string();

        let _guard = self.lock_handles()?;
        if self
            .handles
            .contains_key(identity.handle.as_str())
            .map_err(storage_err)?
        {
            return Err(FlipstockError::DuplicateHandle);
        }

        let mut batch = self.keyspace().batch();
        batch.insert(&self.identities, id.as_str(), record);
        batch.insert(&self.handles, identity.handle.as_str(), id.as_str());
        batch.commit().map_err(storage_err)?;

        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn identity(handle: &str) -> Identity {
        Identity::new(
            Handle::new(handle).unwrap(),
            CredentialHash::from_phc("$argon2id$stub".to_string()),
        )
    }

    #[test]
    fn test_insert_and_find() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        let alice = identity("alice");
        engine.insert_identity(&alice).unwrap();

        assert_eq!(engine.find_identity_by_id(&alice.id).unwrap(), Some(alice.clone()));
        assert_eq!(engine.find_identity_by_handle(&alice.handle).unwrap(), Some(alice));
        assert!(engine.find_identity_by_id(&IdentityId::new()).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_handle_rejected() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        let first = identity("alice");
        engine.insert_identity(&first).unwrap();

        let second = identity("alice");
        assert!(matches!(
            engine.insert_identity(&second),
            Err(FlipstockError::DuplicateHandle)
        ));
        // Loser left no record behind
        assert!(engine.find_identity_by_id(&second.id).unwrap().is_none());
        assert_eq!(engine.find_identity_by_handle(&first.handle).unwrap(), Some(first));
    }

    #[test]
    fn test_concurrent_inserts_single_winner() {
        let (engine, _temp) = StorageEngine::temp().unwrap();
        let engine = Arc::new(engine);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                std::thread::spawn(move || engine.insert_identity(&identity("racer")))
            })
            .collect();

        let results: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(FlipstockError::DuplicateHandle)))
                .count(),
            7
        );
    }
}
