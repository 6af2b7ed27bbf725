// arbor/core/sync/src/hasher.rs

//! Canonical node hashing.
//!
//! The derivation matches the server's tree-hash scheme: an atom hashes
//! as `sha256(0x01 || bytes)` and a pair as `sha256(0x02 || left || right)`.
//! A terminal node is the pair of its key and value atoms; an internal
//! node is the pair of its child hashes taken as-is.

use crate::types::NodeHash;
use sha2::{Digest, Sha256};

const ATOM_PREFIX: u8 = 0x01;
const PAIR_PREFIX: u8 = 0x02;

/// Hash a raw byte sequence as a tree atom
pub fn hash_atom(data: &[u8]) -> NodeHash {
    let mut hasher = Sha256::new();
    hasher.update([ATOM_PREFIX]);
    hasher.update(data);
    NodeHash::new(hasher.finalize().into())
}

/// Canonical hash of a terminal node from its key and value
pub fn hash_terminal(key: &[u8], value: &[u8]) -> NodeHash {
    let key_hash = hash_atom(key);
    let value_hash = hash_atom(value);
    hash_internal(&key_hash, &value_hash)
}

/// Canonical hash of an internal node from its child hashes.
/// Order-sensitive: swapping the children changes the result.
pub fn hash_internal(left: &NodeHash, right: &NodeHash) -> NodeHash {
    let mut hasher = Sha256::new();
    hasher.update([PAIR_PREFIX]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    NodeHash::new(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_hash_deterministic() {
        let a = hash_terminal(b"key1", b"value1");
        let b = hash_terminal(b"key1", b"value1");
        assert_eq!(a, b);
        assert_ne!(a, hash_terminal(b"key1", b"value2"));
        assert_ne!(a, hash_terminal(b"key2", b"value1"));
    }

    #[test]
    fn test_terminal_hash_is_pair_of_atoms() {
        let expected = hash_internal(&hash_atom(b"k"), &hash_atom(b"v"));
        assert_eq!(hash_terminal(b"k", b"v"), expected);
    }

    #[test]
    fn test_internal_hash_order_sensitive() {
        let left = hash_atom(b"left");
        let right = hash_atom(b"right");
        assert_ne!(hash_internal(&left, &right), hash_internal(&right, &left));
    }

    #[test]
    fn test_atom_prefix_domain_separation() {
        // An atom must not collide with the plain digest of the same bytes
        let mut plain = Sha256::new();
        plain.update(b"data");
        let plain: [u8; 32] = plain.finalize().into();
        assert_ne!(hash_atom(b"data"), NodeHash::new(plain));

        // Key and value swap must change the terminal hash
        assert_ne!(hash_terminal(b"a", b"b"), hash_terminal(b"b", b"a"));
    }
}
