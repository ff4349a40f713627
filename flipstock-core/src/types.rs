//! Core data types for flipstock

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{FlipstockError, Result};

/// Longest handle accepted at signup, in characters.
pub const MAX_HANDLE_LEN: usize = 64;

macro_rules! ulid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(ulid::Ulid);

        impl $name {
            /// Generate a fresh, time-ordered identifier
            pub fn new() -> Self {
                $name(ulid::Ulid::new())
            }

            /// Wrap an existing ULID
            pub fn from_ulid(ulid: ulid::Ulid) -> Self {
                $name(ulid)
            }

            /// Get the underlying ULID
            pub fn as_ulid(&self) -> ulid::Ulid {
                self.0
            }

            /// Creation time embedded in the identifier, in ms since the epoch
            pub fn timestamp_ms(&self) -> u64 {
                self.0.timestamp_ms()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = FlipstockError;

            fn from_str(s: &str) -> Result<Self> {
                ulid::Ulid::from_string(s)
                    .map($name)
                    .map_err(|_| FlipstockError::InvalidInput(
                        format!("malformed {} '{}'", stringify!($name), s)
                    ))
            }
        }
    };
}

ulid_id!(
    /// Stable, system-generated identity identifier
    IdentityId
);
ulid_id!(
    /// Product identifier
    ProductId
);
ulid_id!(
    /// Identifier of an image attached to a product
    ImageId
);

/// Unique, human-chosen identity name. Comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Create a handle with validation
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(FlipstockError::InvalidInput("empty handle".to_string()));
        }

        if name.chars().count() > MAX_HANDLE_LEN {
            return Err(FlipstockError::InvalidInput(format!(
                "handle longer than {} characters",
                MAX_HANDLE_LEN
            )));
        }

        if name.chars().any(|c| c.is_control()) {
            return Err(FlipstockError::InvalidInput(
                "control characters not allowed in handle".to_string(),
            ));
        }

        Ok(Handle(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Handle {
    type Error = FlipstockError;

    fn try_from(value: String) -> Result<Self> {
        Handle::new(&value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque, one-way credential hash (a PHC string).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn from_phc(phc: String) -> Self {
        CredentialHash(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// An account that can authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub handle: Handle,
    pub credential: CredentialHash,
}

impl Identity {
    pub fn new(handle: Handle, credential: CredentialHash) -> Self {
        Identity {
            id: IdentityId::new(),
            handle,
            credential,
        }
    }
}

/// Anything with exactly one owning identity.
pub trait Owned {
    fn owner_id(&self) -> &IdentityId;
}

/// Marketplace listings for a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesMeta {
    pub ebay_link: Option<String>,
    pub vinted_link: Option<String>,
    pub other_link: Option<String>,
}

/// Metadata of an image attached to a product; bytes live in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ImageId,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub content_hash: ContentHash,
}

/// A tracked inventory item. `owner_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    owner_id: IdentityId,
    pub title: String,
    pub description: Option<String>,
    pub bought_price: Option<f64>,
    pub target_price: Option<f64>,
    pub sold_price: Option<f64>,
    pub sales_meta: Option<SalesMeta>,
    pub note: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl Product {
    pub fn new(owner_id: IdentityId, title: String) -> Self {
        Product {
            id: ProductId::new(),
            owner_id,
            title,
            description: None,
            bought_price: None,
            target_price: None,
            sold_price: None,
            sales_meta: None,
            note: None,
            images: Vec::new(),
        }
    }

    /// Creation time in ms since the epoch, taken from the product id
    pub fn created_at_ms(&self) -> u64 {
        self.id.timestamp_ms()
    }

    pub fn is_sold(&self) -> bool {
        self.sold_price.is_some()
    }

    pub fn image(&self, image_id: &ImageId) -> Option<&ProductImage> {
        self.images.iter().find(|img| &img.id == image_id)
    }
}

impl Owned for Product {
    fn owner_id(&self) -> &IdentityId {
        &self.owner_id
    }
}

/// Content hash used to address image blobs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create hash from data using BLAKE3
    pub fn new(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        ContentHash(hash.into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        ContentHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

mod hex {
    use std::fmt::Write;

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().fold(String::new(), |mut output, b| {
            let _ = write!(output, "{:02x}", b);
            output
        })
    }
}
