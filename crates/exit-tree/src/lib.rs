//! Deposit exit tree for the X Layer bridge
//!
//! An append-only keccak Merkle tree of fixed height that records one leaf per
//! bridging operation. Key features:
//! - Frontier insertion: O(height) per leaf, no full rebuild
//! - Cached root, readable in O(1) even for an empty tree
//! - Proof verification as a pure function of leaf, path, index and root
//! - Off-tree proof generation by replaying committed leaves

use std::sync::LazyLock;

mod error;
mod hasher;
mod proof;
mod replay;
mod tree;

pub use error::{ProofError, TreeError};
pub use hasher::Keccak256Hasher;
pub use proof::{MerkleProof, compute_root_from_proof, verify_merkle_proof};
pub use replay::ReplayTree;
pub use tree::IncrementalMerkleTree;

/// 32-byte hash type
pub type Hash = [u8; 32];

/// Exit tree height
pub const TREE_HEIGHT: usize = 32;

/// Number of leaves a tree of [`TREE_HEIGHT`] can hold
pub const MAX_DEPOSIT_COUNT: u64 = 1 << TREE_HEIGHT;

/// The all-zero hash, used as the empty leaf
pub const ZERO_HASH: Hash = [0u8; 32];

static ZERO_HASHES: LazyLock<[Hash; TREE_HEIGHT + 1]> = LazyLock::new(|| {
    let mut hashes = [ZERO_HASH; TREE_HEIGHT + 1];
    for level in 0..TREE_HEIGHT {
        hashes[level + 1] = Keccak256Hasher::hash_pair(&hashes[level], &hashes[level]);
    }
    hashes
});

/// Roots of empty subtrees, indexed by level.
///
/// `zero_hashes()[0]` is the empty leaf and `zero_hashes()[TREE_HEIGHT]` is the root of
/// a tree with no deposits.
pub fn zero_hashes() -> &'static [Hash; TREE_HEIGHT + 1] {
    &ZERO_HASHES
}

/// Root of an exit tree with no deposits
pub fn empty_root() -> Hash {
    ZERO_HASHES[TREE_HEIGHT]
}

/// Format a hash as `0x`-prefixed hex
pub fn format_hash_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}
