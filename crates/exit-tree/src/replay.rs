//! Off-tree leaf store for root rebuilding and proof generation

use crate::{
    Hash, Keccak256Hasher, MAX_DEPOSIT_COUNT, TREE_HEIGHT, empty_root, error::TreeError,
    proof::MerkleProof, zero_hashes,
};

/// Exit tree rebuilt from its full list of leaves.
///
/// The incremental tree keeps only a frontier and cannot produce authentication
/// paths. Anyone holding the ordered leaves can, so proofs are generated here by
/// replaying them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayTree {
    leaves: Vec<Hash>,
}

impl ReplayTree {
    /// Create a new empty replay tree
    pub const fn new() -> Self {
        Self { leaves: Vec::new() }
    }

    /// Build from an ordered list of leaves
    pub fn from_leaves(leaves: impl IntoIterator<Item = Hash>) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for leaf in leaves {
            tree.push(leaf)?;
        }
        Ok(tree)
    }

    /// Append a leaf, returning its index
    pub fn push(&mut self, leaf: Hash) -> Result<u64, TreeError> {
        let index = self.leaves.len() as u64;
        if index >= MAX_DEPOSIT_COUNT {
            return Err(TreeError::CapacityExceeded { capacity: MAX_DEPOSIT_COUNT });
        }
        self.leaves.push(leaf);
        Ok(index)
    }

    /// Number of leaves
    pub fn len(&self) -> u64 {
        self.leaves.len() as u64
    }

    /// Whether no leaf has been pushed yet
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Leaves in insertion order
    pub fn leaves(&self) -> &[Hash] {
        &self.leaves
    }

    /// Root computed from scratch over all leaves
    pub fn root(&self) -> Hash {
        self.levels()
            .last()
            .and_then(|top| top.first().copied())
            .unwrap_or_else(empty_root)
    }

    /// Authentication path for the leaf at `index`
    pub fn proof(&self, index: u64) -> Option<MerkleProof> {
        let leaf = *self.leaves.get(usize::try_from(index).ok()?)?;
        let zeros = zero_hashes();
        let levels = self.levels();

        let siblings = (0..TREE_HEIGHT)
            .map(|level| {
                let sibling = ((index >> level) ^ 1) as usize;
                levels[level].get(sibling).copied().unwrap_or(zeros[level])
            })
            .collect();

        Some(MerkleProof { leaf, index, siblings })
    }

    /// Materialized nodes per level, from the leaves (level 0) up to the root.
    ///
    /// Only the occupied prefix of each level is stored; missing right children are
    /// the empty subtree hash of that level.
    fn levels(&self) -> Vec<Vec<Hash>> {
        let zeros = zero_hashes();
        let mut levels = Vec::with_capacity(TREE_HEIGHT + 1);
        levels.push(self.leaves.clone());

        for zero in zeros.iter().take(TREE_HEIGHT) {
            let below = &levels[levels.len() - 1];
            let next: Vec<Hash> = below
                .chunks(2)
                .map(|pair| Keccak256Hasher::hash_pair(&pair[0], pair.get(1).unwrap_or(zero)))
                .collect();
            levels.push(next);
        }

        levels
    }
}
