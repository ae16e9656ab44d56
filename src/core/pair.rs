use sha2::{Digest, Sha256};

use crate::models::UserId;

/// Canonical, order-independent key for a pair of users
///
/// SHA-256 over `"{smaller}:{larger}"`, hex encoded, so
/// `canonical_key(a, b) == canonical_key(b, a)`. Both concurrent match
/// attempts for a pair converge on this key, which is what lets the match
/// store's uniqueness constraint enforce exactly-once creation.
///
/// Callers reject non-positive ids before calling.
pub fn canonical_key(user_a: UserId, user_b: UserId) -> String {
    let (low, high) = if user_a <= user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    };

    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", low, high).as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_is_symmetric() {
        assert_eq!(canonical_key(1, 2), canonical_key(2, 1));
        assert_eq!(canonical_key(42, 7), canonical_key(7, 42));
    }

    #[test]
    fn test_key_is_hex_sha256() {
        let key = canonical_key(1, 2);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, hex::encode(Sha256::digest(b"1:2")));
        assert_eq!(canonical_key(2, 1), hex::encode(Sha256::digest(b"1:2")));
    }

    #[test]
    fn test_distinct_pairs_do_not_collide() {
        let mut seen = HashSet::new();
        for a in 1..40 {
            for b in (a + 1)..40 {
                assert!(seen.insert(canonical_key(a, b)), "collision for ({}, {})", a, b);
            }
        }
    }

    #[test]
    fn test_separator_prevents_concatenation_ambiguity() {
        // "1:23" and "12:3" must not hash alike
        assert_ne!(canonical_key(1, 23), canonical_key(12, 3));
    }
}
