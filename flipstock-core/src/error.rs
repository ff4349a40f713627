//! Error types for flipstock

use thiserror::Error;

/// Every failure a core operation can report.
///
/// The auth variants carry no detail on purpose: callers must not be able to
/// tell an unknown handle from a wrong password, or a foreign product from a
/// missing one.
#[derive(Error, Debug)]
pub enum FlipstockError {
    #[error("Handle already exists")]
    DuplicateHandle,

    #[error("Invalid handle or secret")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlipstockError {
    /// True for failures the caller caused (bad input, bad credentials,
    /// missing resources) as opposed to faults inside the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FlipstockError::DuplicateHandle
                | FlipstockError::InvalidCredentials
                | FlipstockError::InvalidToken
                | FlipstockError::Unauthenticated
                | FlipstockError::NotFound
                | FlipstockError::InvalidInput(_)
        )
    }
}
