//! Constant-time comparisons

use subtle::ConstantTimeEq;

use crate::IdentityId;

/// Constant-time byte slice comparison
pub fn constant_time_bytes_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Constant-time identity id comparison
pub fn constant_time_id_eq(a: &IdentityId, b: &IdentityId) -> bool {
    constant_time_bytes_eq(&a.as_ulid().to_bytes(), &b.as_ulid().to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_eq() {
        assert!(constant_time_bytes_eq(b"abc", b"abc"));
        assert!(!constant_time_bytes_eq(b"abc", b"abd"));
        assert!(!constant_time_bytes_eq(b"abc", b"abcd"));
        assert!(constant_time_bytes_eq(b"", b""));
    }

    #[test]
    fn test_id_eq() {
        let a = IdentityId::new();
        let b = IdentityId::new();

        assert!(constant_time_id_eq(&a, &a));
        assert!(!constant_time_id_eq(&a, &b));
    }
}
