//! Keccak256 hasher for the exit tree

use tiny_keccak::{Hasher, Keccak};

use crate::Hash;

/// Keccak256 hasher
#[derive(Clone, Copy, Debug, Default)]
pub struct Keccak256Hasher;

impl Keccak256Hasher {
    /// Hash two nodes together as `keccak(left || right)`
    pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
        keccak(&[left.as_slice(), right.as_slice()])
    }

    /// Hash arbitrary bytes
    pub fn hash(data: &[u8]) -> Hash {
        keccak(&[data])
    }
}

/// keccak256 over the concatenation of `chunks`
fn keccak(chunks: &[&[u8]]) -> Hash {
    let mut hasher = Keccak::v256();
    for chunk in chunks {
        hasher.update(chunk);
    }
    let mut digest = [0u8; 32];
    hasher.finalize(&mut digest);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_pair_is_concatenation() {
        let left = [1u8; 32];
        let right = [2u8; 32];

        let mut joined = [0u8; 64];
        joined[..32].copy_from_slice(&left);
        joined[32..].copy_from_slice(&right);

        assert_eq!(Keccak256Hasher::hash_pair(&left, &right), Keccak256Hasher::hash(&joined));
        assert_ne!(
            Keccak256Hasher::hash_pair(&left, &right),
            Keccak256Hasher::hash_pair(&right, &left)
        );
    }

    #[test]
    fn test_hash_empty_input() {
        assert_eq!(
            hex::encode(Keccak256Hasher::hash(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
