//! Product records and the per-owner index

use flipstock_core::store::ProductStore;
use flipstock_core::*;

use crate::{storage_err, StorageEngine};

impl StorageEngine {
    // Owner index key: "{owner}:{product}". ULIDs keep it in creation order.
    fn owned_key(owner: &IdentityId, product: &ProductId) -> String {
        format!("{}:{}", owner, product)
    }
}

impl ProductStore for StorageEngine {
    fn find_product_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        match self.products.get(id.to_string()).map_err(storage_err)? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn list_products_by_owner(&self, owner: &IdentityId) -> Result<Vec<Product>> {
        let prefix = format!("{}:", owner);
        let mut products = Vec::new();

        for item in self.owned.prefix(prefix.as_bytes()) {
            let (key, _) = item.map_err(storage_err)?;
            let key = std::str::from_utf8(&key).map_err(storage_err)?;
            let Some(product_id) = key.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let product_id: ProductId = product_id.parse()?;

            // Index and record are written in one batch; a gap means a concurrent delete
            if let Some(product) = self.find_product_by_id(&product_id)? {
                products.push(product);
            }
        }

        Ok(products)
    }

    fn save_product(&self, product: &Product) -> Result<()> {
        let record = serde_json::to_vec(product)?;

        let mut batch = self.keyspace().batch();
        batch.insert(&self.products, product.id.to_string(), record);
        batch.insert(
            &self.owned,
            Self::owned_key(product.owner_id(), &product.id),
            Vec::<u8>::new(),
        );
        batch.commit().map_err(storage_err)?;

        self.persist()
    }

    fn delete_product(&self, id: &ProductId) -> Result<()> {
        let Some(product) = self.find_product_by_id(id)? else {
            return Ok(());
        };

        let mut batch = self.keyspace().batch();
        batch.remove(&self.products, id.to_string());
        batch.remove(&self.owned, Self::owned_key(product.owner_id(), id));
        batch.commit().map_err(storage_err)?;

        self.persist()
    }
}
