//! Owner-scoped product operations
//!
//! Every operation takes an already-resolved [`Identity`] and runs the
//! ownership guard before reading or changing anything. Images are reached
//! only through their product and share its owner.

use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::auth::require_owned;
use crate::store::{BlobStore, ProductStore};
use crate::{
    FlipstockError, Identity, ImageId, Product, ProductId, ProductImage, Result, SalesMeta,
};

/// Largest accepted image, in bytes
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Longest accepted image filename, in bytes
pub const MAX_FILENAME_LEN: usize = 255;

/// Fields for a new product. `price` is what the item was bought for.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub target_price: Option<f64>,
    pub note: Option<String>,
}

/// Partial update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub bought_price: Option<f64>,
    pub target_price: Option<f64>,
    pub note: Option<String>,
}

/// An image upload
#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Product operations over one store.
///
/// Every load-modify-save of an existing product runs under a write lock
/// shared by all clones, so concurrent edits never overwrite each other.
pub struct Inventory<S> {
    store: Arc<S>,
    write_lock: Arc<Mutex<()>>,
}

impl<S> Clone for Inventory<S> {
    fn clone(&self) -> Self {
        Inventory {
            store: self.store.clone(),
            write_lock: self.write_lock.clone(),
        }
    }
}

impl<S: ProductStore + BlobStore> Inventory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Inventory {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| FlipstockError::Internal("product write lock poisoned".to_string()))
    }

    fn load(&self, identity: &Identity, id: &ProductId) -> Result<Product> {
        require_owned(identity, self.store.find_product_by_id(id)?)
    }

    /// Products owned by `identity`
    pub fn list(&self, identity: &Identity) -> Result<Vec<Product>> {
        self.store.list_products_by_owner(&identity.id)
    }

    pub fn create(&self, identity: &Identity, new: NewProduct) -> Result<Product> {
        let title = validate_title(&new.title)?;
        validate_price("price", Some(new.price))?;
        validate_price("target_price", new.target_price)?;

        let mut product = Product::new(identity.id, title);
        product.description = new.description;
        product.bought_price = Some(new.price);
        product.target_price = new.target_price;
        product.note = new.note;

        self.store.save_product(&product)?;
        info!(product = %product.id, owner = %identity.id, "product created");
        Ok(product)
    }

    pub fn get(&self, identity: &Identity, id: &ProductId) -> Result<Product> {
        self.load(identity, id)
    }

    pub fn update(
        &self,
        identity: &Identity,
        id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Product> {
        let _guard = self.lock_writes()?;
        let mut product = self.load(identity, id)?;

        validate_price("bought_price", update.bought_price)?;
        validate_price("target_price", update.target_price)?;

        if let Some(title) = update.title {
            product.title = validate_title(&title)?;
        }
        if let Some(description) = update.description {
            product.description = Some(description);
        }
        if let Some(bought_price) = update.bought_price {
            product.bought_price = Some(bought_price);
        }
        if let Some(target_price) = update.target_price {
            product.target_price = Some(target_price);
        }
        if let Some(note) = update.note {
            product.note = Some(note);
        }

        self.store.save_product(&product)?;
        Ok(product)
    }

    /// Record the sale price
    pub fn sell(&self, identity: &Identity, id: &ProductId, sold_price: f64) -> Result<Product> {
        validate_price("sold_price", Some(sold_price))?;
        let _guard = self.lock_writes()?;
        let mut product = self.load(identity, id)?;
        product.sold_price = Some(sold_price);
        self.store.save_product(&product)?;
        info!(product = %product.id, "product sold");
        Ok(product)
    }

    /// Replace the marketplace links
    pub fn set_sales_meta(
        &self,
        identity: &Identity,
        id: &ProductId,
        meta: SalesMeta,
    ) -> Result<Product> {
        let _guard = self.lock_writes()?;
        let mut product = self.load(identity, id)?;
        product.sales_meta = Some(meta);
        self.store.save_product(&product)?;
        Ok(product)
    }

    /// Delete a product and release its images
    pub fn delete(&self, identity: &Identity, id: &ProductId) -> Result<()> {
        let _guard = self.lock_writes()?;
        let product = self.load(identity, id)?;
        self.store.delete_product(&product.id)?;

        for image in &product.images {
            self.store.release_blob(&image.content_hash)?;
        }

        info!(product = %product.id, "product deleted");
        Ok(())
    }

    pub fn add_image(
        &self,
        identity: &Identity,
        id: &ProductId,
        image: NewImage,
    ) -> Result<ProductImage> {
        let filename = validate_filename(&image.filename)?;
        validate_image(&image.content_type, &image.data)?;

        let _guard = self.lock_writes()?;
        let mut product = self.load(identity, id)?;

        let content_hash = self.store.put_blob(&image.data)?;
        let record = ProductImage {
            id: ImageId::new(),
            filename,
            content_type: image.content_type,
            size: image.data.len() as u64,
            content_hash,
        };
        product.images.push(record.clone());

        if let Err(e) = self.store.save_product(&product) {
            if let Err(release) = self.store.release_blob(&record.content_hash) {
                warn!(error = %release, "failed to release blob after aborted image upload");
            }
            return Err(e);
        }

        Ok(record)
    }

    /// Image metadata and bytes
    pub fn get_image(
        &self,
        identity: &Identity,
        id: &ProductId,
        image_id: &ImageId,
    ) -> Result<(ProductImage, Vec<u8>)> {
        let product = self.load(identity, id)?;
        let record = product.image(image_id).cloned().ok_or(FlipstockError::NotFound)?;

        let data = self.store.get_blob(&record.content_hash)?.ok_or_else(|| {
            FlipstockError::Internal(format!("missing blob {}", record.content_hash.to_hex()))
        })?;

        Ok((record, data))
    }

    pub fn remove_image(
        &self,
        identity: &Identity,
        id: &ProductId,
        image_id: &ImageId,
    ) -> Result<()> {
        let _guard = self.lock_writes()?;
        let mut product = self.load(identity, id)?;
        let position = product
            .images
            .iter()
            .position(|img| &img.id == image_id)
            .ok_or(FlipstockError::NotFound)?;

        let record = product.images.remove(position);
        self.store.save_product(&product)?;
        self.store.release_blob(&record.content_hash)?;
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(FlipstockError::InvalidInput("title must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_price(field: &str, price: Option<f64>) -> Result<()> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(FlipstockError::InvalidInput(format!(
            "{} must be a non-negative number",
            field
        ))),
        _ => Ok(()),
    }
}

fn validate_filename(filename: &str) -> Result<String> {
    let name = filename.trim();
    if name.is_empty() || name.len() > MAX_FILENAME_LEN {
        return Err(FlipstockError::InvalidInput("bad image filename".to_string()));
    }
    if name.contains(['/', '\\']) || name.chars().any(|c| c.is_control()) || name == ".." {
        return Err(FlipstockError::InvalidInput(
            "image filename must be a plain file name".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn validate_image(content_type: &str, data: &[u8]) -> Result<()> {
    if !content_type.starts_with("image/") {
        return Err(FlipstockError::InvalidInput(format!(
            "unsupported content type '{}'",
            content_type
        )));
    }
    if data.is_empty() {
        return Err(FlipstockError::InvalidInput("empty image".to_string()));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(FlipstockError::InvalidInput(format!(
            "image larger than {} bytes",
            MAX_IMAGE_BYTES
        )));
    }
    Ok(())
}
