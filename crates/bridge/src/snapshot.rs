//! Persistent bridge state

use serde::{Deserialize, Serialize};
use xlayer_exit_tree::{IncrementalMerkleTree, TREE_HEIGHT};

use crate::{bridge::Bridge, error::BridgeError, exit_root::GlobalExitRootAggregator, types::Hash};

/// Everything needed to resume a bridge without replaying its events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    /// Tree height the frontier was built for
    pub height: u32,
    /// Number of deposits
    pub deposit_count: u64,
    /// Exit tree frontier, indexed by level
    pub frontier: [Hash; TREE_HEIGHT],
    /// Exit tree root
    pub deposit_root: Hash,
    /// Local exit root behind the current global exit root
    pub last_local_exit_root: Hash,
    /// Counterpart exit root behind the current global exit root
    pub last_counterpart_exit_root: Hash,
    /// Deposit count behind `last_local_exit_root`
    pub last_published_deposit_count: Option<u64>,
    /// Latest observed counterpart exit root, possibly not yet published
    pub counterpart_exit_root: Hash,
    /// Claimed counterpart deposit indices
    pub claimed: Vec<u64>,
}

impl BridgeSnapshot {
    pub(crate) fn capture(bridge: &Bridge) -> Self {
        let tree = bridge.tree();
        let aggregator = bridge.aggregator();
        Self {
            height: TREE_HEIGHT as u32,
            deposit_count: tree.deposit_count(),
            frontier: *tree.frontier(),
            deposit_root: tree.root(),
            last_local_exit_root: aggregator.last_local_exit_root(),
            last_counterpart_exit_root: aggregator.last_counterpart_exit_root(),
            last_published_deposit_count: aggregator.last_published_deposit_count(),
            counterpart_exit_root: bridge.counterpart_exit_root(),
            claimed: bridge.claims().claimed().collect(),
        }
    }

    /// Rebuild the exit tree, checking height and root
    pub fn tree(&self) -> Result<IncrementalMerkleTree, BridgeError> {
        if self.height as usize != TREE_HEIGHT {
            return Err(BridgeError::HeightMismatch {
                expected: TREE_HEIGHT as u32,
                found: self.height,
            });
        }
        Ok(IncrementalMerkleTree::restore(self.frontier, self.deposit_count, self.deposit_root)?)
    }

    /// Rebuild the global exit root state.
    ///
    /// The last publication can never cover more deposits than the tree holds.
    pub fn aggregator(&self) -> Result<GlobalExitRootAggregator, BridgeError> {
        if let Some(published) = self.last_published_deposit_count &&
            published > self.deposit_count
        {
            return Err(BridgeError::PublishedAheadOfTree {
                published,
                deposit_count: self.deposit_count,
            });
        }
        Ok(GlobalExitRootAggregator::restore(
            self.last_local_exit_root,
            self.last_counterpart_exit_root,
            self.last_published_deposit_count,
        ))
    }

    /// Encode with bincode
    pub fn to_bytes(&self) -> Result<Vec<u8>, BridgeError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BridgeError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
