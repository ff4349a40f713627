//! Authentication and ownership enforcement
//!
//! - Argon2id credential hashing keyed with a process secret
//! - Stateless HS256 session tokens
//! - Token -> identity resolution
//! - Owner-only access to resources
//! - Constant-time comparisons

pub mod guard;
pub mod hasher;
pub mod resolver;
pub mod service;
pub mod timing;
pub mod token;

pub use guard::*;
pub use hasher::*;
pub use resolver::*;
pub use service::*;
pub use timing::*;
pub use token::*;
