//! Merkle proof verification

use serde::{Deserialize, Serialize};

use crate::{Hash, Keccak256Hasher, MAX_DEPOSIT_COUNT, TREE_HEIGHT, error::ProofError};

/// Inclusion proof for one exit tree leaf
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// The leaf being proven
    pub leaf: Hash,
    /// Position of the leaf (its deposit count at insertion)
    pub index: u64,
    /// Sibling hashes from leaf level to the level below the root
    pub siblings: Vec<Hash>,
}

impl MerkleProof {
    /// Verify this proof against a root hash
    pub fn verify(&self, root: &Hash) -> Result<bool, ProofError> {
        verify_merkle_proof(&self.leaf, &self.siblings, self.index, root)
    }

    /// Compute root from proof
    pub fn compute_root(&self) -> Result<Hash, ProofError> {
        compute_root_from_proof(&self.leaf, &self.siblings, self.index)
    }
}

/// Fold an authentication path into a root.
///
/// Bit `level` of `index` selects the side: 0 puts the running node on the left,
/// 1 puts it on the right.
pub fn compute_root_from_proof(
    leaf: &Hash,
    siblings: &[Hash],
    index: u64,
) -> Result<Hash, ProofError> {
    if siblings.len() != TREE_HEIGHT {
        return Err(ProofError::InvalidProofLength {
            expected: TREE_HEIGHT,
            actual: siblings.len(),
        });
    }

    let mut node = *leaf;
    for (level, sibling) in siblings.iter().enumerate() {
        node = if (index >> level) & 1 == 1 {
            Keccak256Hasher::hash_pair(sibling, &node)
        } else {
            Keccak256Hasher::hash_pair(&node, sibling)
        };
    }

    Ok(node)
}

/// Check that `leaf` sits at `index` under `root`.
///
/// A path of the wrong length is a caller error and is reported as
/// [`ProofError::InvalidProofLength`]. An index outside the tree never verifies.
pub fn verify_merkle_proof(
    leaf: &Hash,
    siblings: &[Hash],
    index: u64,
    root: &Hash,
) -> Result<bool, ProofError> {
    let computed = compute_root_from_proof(leaf, siblings, index)?;
    Ok(index < MAX_DEPOSIT_COUNT && computed == *root)
}
