//! Ownership guard
//!
//! A resource is visible to exactly one identity: its owner. Everyone else
//! gets the same answer as for a resource that does not exist.

use tracing::debug;

use super::timing::constant_time_id_eq;
use crate::{FlipstockError, Identity, Owned, Result};

/// Outcome of an ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
}

impl Access {
    pub fn is_granted(self) -> bool {
        self == Access::Granted
    }

    /// Convert to the externally visible result. `Denied` becomes `NotFound`.
    pub fn into_result(self) -> Result<()> {
        match self {
            Access::Granted => Ok(()),
            Access::Denied => Err(FlipstockError::NotFound),
        }
    }
}

/// Granted iff `resource` is owned by `identity`
pub fn authorize<R: Owned>(identity: &Identity, resource: &R) -> Access {
    if constant_time_id_eq(resource.owner_id(), &identity.id) {
        Access::Granted
    } else {
        Access::Denied
    }
}

/// Apply the guard to the result of a by-id lookup.
///
/// Missing and foreign resources both come back as `NotFound`; only the
/// debug log tells them apart.
pub fn require_owned<R: Owned>(identity: &Identity, found: Option<R>) -> Result<R> {
    let Some(resource) = found else {
        debug!(identity = %identity.id, "resource lookup: absent");
        return Err(FlipstockError::NotFound);
    };

    match authorize(identity, &resource) {
        Access::Granted => Ok(resource),
        Access::Denied => {
            debug!(identity = %identity.id, "resource lookup: owned by another identity");
            Err(FlipstockError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CredentialHash, Handle, Product};

    fn identity(handle: &str) -> Identity {
        Identity::new(
            Handle::new(handle).unwrap(),
            CredentialHash::from_phc("$argon2id$stub".to_string()),
        )
    }

    #[test]
    fn test_owner_is_granted() {
        let alice = identity("alice");
        let product = Product::new(alice.id, "lamp".to_string());

        assert_eq!(authorize(&alice, &product), Access::Granted);
        assert!(authorize(&alice, &product).into_result().is_ok());
    }

    #[test]
    fn test_other_identity_is_denied() {
        let alice = identity("alice");
        let bob = identity("bob");
        let product = Product::new(alice.id, "lamp".to_string());

        assert_eq!(authorize(&bob, &product), Access::Denied);
        assert!(!authorize(&bob, &product).is_granted());
    }

    #[test]
    fn test_same_handle_different_id_is_denied() {
        // A re-created account does not inherit the old account's data
        let original = identity("alice");
        let recreated = identity("alice");
        let product = Product::new(original.id, "lamp".to_string());

        assert_eq!(authorize(&recreated, &product), Access::Denied);
    }

    #[test]
    fn test_denied_and_missing_look_identical() {
        let alice = identity("alice");
        let bob = identity("bob");
        let product = Product::new(alice.id, "lamp".to_string());

        let denied = require_owned(&bob, Some(product)).unwrap_err();
        let missing = require_owned::<Product>(&bob, None).unwrap_err();

        assert!(matches!(denied, FlipstockError::NotFound));
        assert!(matches!(missing, FlipstockError::NotFound));
        assert_eq!(denied.to_string(), missing.to_string());
    }
}
