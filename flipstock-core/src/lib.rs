//! Core types, authentication and owner-scoped inventory for flipstock

pub mod auth;
pub mod config;
pub mod error;
pub mod inventory;
pub mod store;
pub mod types;

pub use auth::{
    authorize, Access, AuthService, CredentialHasher, IdentityResolver, SessionClaims,
    SessionToken, TokenCodec,
};
pub use config::{AuthConfig, HashCost};
pub use error::*;
pub use inventory::{Inventory, NewImage, NewProduct, ProductUpdate};
pub use types::*;

/// Result type alias for flipstock operations
pub type Result<T> = std::result::Result<T, FlipstockError>;
