//! Incremental Merkle tree over a per-level frontier

use crate::{
    Hash, Keccak256Hasher, MAX_DEPOSIT_COUNT, TREE_HEIGHT, ZERO_HASH, error::TreeError,
    zero_hashes,
};

/// Append-only Merkle tree of height [`TREE_HEIGHT`].
///
/// Only the frontier is stored: for every level, the last left-child node that was
/// completed there. Whether a frontier slot is live follows from the binary form of
/// `deposit_count`, so no separate bookkeeping is needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncrementalMerkleTree {
    frontier: [Hash; TREE_HEIGHT],
    deposit_count: u64,
    root: Hash,
}

impl IncrementalMerkleTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self { frontier: [ZERO_HASH; TREE_HEIGHT], deposit_count: 0, root: zero_hashes()[TREE_HEIGHT] }
    }

    /// Rebuild a tree from persisted parts.
    ///
    /// For a tree that is not full the root is recomputed from the frontier and must
    /// match `root`. A full tree keeps `root` as given, because its top node is never
    /// written to the frontier.
    pub fn restore(
        frontier: [Hash; TREE_HEIGHT],
        deposit_count: u64,
        root: Hash,
    ) -> Result<Self, TreeError> {
        if deposit_count > MAX_DEPOSIT_COUNT {
            return Err(TreeError::InvalidDepositCount {
                deposit_count,
                capacity: MAX_DEPOSIT_COUNT,
            });
        }

        if deposit_count < MAX_DEPOSIT_COUNT {
            let computed = compute_root(&frontier, deposit_count);
            if computed != root {
                return Err(TreeError::RootMismatch { expected: root, computed });
            }
        }

        Ok(Self { frontier, deposit_count, root })
    }

    /// Append a leaf at position `deposit_count`.
    ///
    /// Returns the new deposit count and the new root. On `CapacityExceeded` the tree is
    /// left untouched.
    pub fn insert(&mut self, leaf: Hash) -> Result<(u64, Hash), TreeError> {
        if self.deposit_count >= MAX_DEPOSIT_COUNT {
            return Err(TreeError::CapacityExceeded { capacity: MAX_DEPOSIT_COUNT });
        }

        // Parity is taken from the position being filled, not the next open slot.
        let mut index = self.deposit_count;
        let mut node = leaf;
        let mut parked = false;

        for slot in &mut self.frontier {
            if index & 1 == 0 {
                *slot = node;
                parked = true;
                break;
            }
            node = Keccak256Hasher::hash_pair(slot, &node);
            index >>= 1;
        }

        self.deposit_count += 1;
        // The last leaf completes every level; the propagated node is the root itself.
        self.root = if parked { compute_root(&self.frontier, self.deposit_count) } else { node };

        Ok((self.deposit_count, self.root))
    }

    /// Get the current root
    pub const fn root(&self) -> Hash {
        self.root
    }

    /// Number of leaves inserted so far
    pub const fn deposit_count(&self) -> u64 {
        self.deposit_count
    }

    /// Maximum number of leaves
    pub const fn capacity(&self) -> u64 {
        MAX_DEPOSIT_COUNT
    }

    /// Frontier nodes, indexed by level
    pub const fn frontier(&self) -> &[Hash; TREE_HEIGHT] {
        &self.frontier
    }

    /// Bitmask of levels whose frontier slot holds a live left sibling.
    ///
    /// A full tree has written every level, so all bits are set even though
    /// `deposit_count` (2^32) has none of its low 32 bits set.
    pub const fn filled_levels(&self) -> u32 {
        if self.deposit_count >= MAX_DEPOSIT_COUNT { u32::MAX } else { self.deposit_count as u32 }
    }
}

impl Default for IncrementalMerkleTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Root of a tree holding `deposit_count` leaves (`deposit_count < MAX_DEPOSIT_COUNT`).
///
/// Walks upward from the first empty leaf position: where the count has a set bit the
/// frontier holds the left sibling, otherwise the right side is an empty subtree.
fn compute_root(frontier: &[Hash; TREE_HEIGHT], deposit_count: u64) -> Hash {
    let zeros = zero_hashes();
    let mut node = ZERO_HASH;
    let mut size = deposit_count;

    for (level, branch) in frontier.iter().enumerate() {
        node = if size & 1 == 1 {
            Keccak256Hasher::hash_pair(branch, &node)
        } else {
            Keccak256Hasher::hash_pair(&node, &zeros[level])
        };
        size >>= 1;
    }

    node
}
