//! Claim verification against published global exit roots

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use xlayer_exit_tree::{format_hash_hex, verify_merkle_proof};

use crate::{
    error::BridgeError,
    exit_root::{GlobalExitRootAggregator, calculate_global_exit_root},
    leaf::LeafDescriptor,
    types::{Hash, NetworkId},
};

/// A deposit from the counterpart network being claimed here
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// The deposit as committed on the counterpart network
    pub descriptor: LeafDescriptor,
    /// Authentication path in the counterpart exit tree
    pub proof: Vec<Hash>,
    /// Deposit count of the leaf in the counterpart exit tree
    pub index: u64,
    /// Local exit root half of the global exit root
    pub local_exit_root: Hash,
    /// Counterpart exit root half of the global exit root; the proof is checked against it
    pub counterpart_exit_root: Hash,
}

/// Tracks claimed deposit indices for one destination network
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimTracker {
    network_id: NetworkId,
    claimed: BTreeSet<u64>,
}

impl ClaimTracker {
    /// Create a tracker for claims landing on `network_id`
    pub const fn new(network_id: NetworkId) -> Self {
        Self { network_id, claimed: BTreeSet::new() }
    }

    /// Resume with previously claimed indices
    pub fn restore(network_id: NetworkId, claimed: impl IntoIterator<Item = u64>) -> Self {
        Self { network_id, claimed: claimed.into_iter().collect() }
    }

    /// Verify a claim and mark it as claimed. Returns the claimed leaf.
    pub fn claim(
        &mut self,
        claim: &Claim,
        aggregator: &GlobalExitRootAggregator,
    ) -> Result<Hash, BridgeError> {
        let destination = claim.descriptor.destination_network;
        if destination != self.network_id {
            return Err(BridgeError::DestinationNetworkInvalid {
                network_id: self.network_id,
                destination,
            });
        }

        let global_root =
            calculate_global_exit_root(&claim.local_exit_root, &claim.counterpart_exit_root);
        if !aggregator.is_published(&global_root) {
            warn!(global_root = %format_hash_hex(&global_root), "Claim against unknown global exit root");
            return Err(BridgeError::GlobalExitRootInvalid(global_root));
        }

        let leaf = claim.descriptor.encode();
        if !verify_merkle_proof(&leaf, &claim.proof, claim.index, &claim.counterpart_exit_root)? {
            return Err(BridgeError::InvalidSmtProof(claim.index));
        }

        if !self.claimed.insert(claim.index) {
            return Err(BridgeError::AlreadyClaimed(claim.index));
        }

        info!(index = claim.index, leaf = %format_hash_hex(&leaf), "Claimed deposit");
        Ok(leaf)
    }

    /// Whether a deposit index was claimed
    pub fn is_claimed(&self, index: u64) -> bool {
        self.claimed.contains(&index)
    }

    /// Claimed indices in ascending order
    pub fn claimed(&self) -> impl Iterator<Item = u64> + '_ {
        self.claimed.iter().copied()
    }
}
