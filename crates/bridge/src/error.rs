//! Bridge error types

use thiserror::Error;
use xlayer_exit_tree::{ProofError, TreeError};

use crate::types::NetworkId;

/// Bridge error types
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Exit tree insertion or restoration failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// A malformed proof was supplied.
    #[error(transparent)]
    Proof(#[from] ProofError),
    /// Deposits must target another known network.
    #[error("destination network {destination} is invalid for network {network_id}")]
    DestinationNetworkInvalid {
        /// This bridge's network
        network_id: NetworkId,
        /// Requested destination
        destination: NetworkId,
    },
    /// A leaf type byte outside the known set.
    #[error("unknown leaf type {0}")]
    UnknownLeafType(u8),
    /// Events must carry consecutive deposit counts.
    #[error("bridge event out of order: expected deposit count {expected}, found {found}")]
    EventOutOfOrder {
        /// Deposit count the ledger expects next
        expected: u64,
        /// Deposit count carried by the event
        found: u64,
    },
    /// No event with this deposit count is held.
    #[error("no bridge event recorded for deposit count {0}")]
    UnknownDeposit(u64),
    /// The claimed global exit root was never published.
    #[error("global exit root 0x{} was never published", hex::encode(.0))]
    GlobalExitRootInvalid([u8; 32]),
    /// The claim proof does not lead to the counterpart exit root.
    #[error("claim proof for index {0} does not match the exit root")]
    InvalidSmtProof(u64),
    /// The deposit was claimed before.
    #[error("deposit {0} already claimed")]
    AlreadyClaimed(u64),
    /// A snapshot was taken from a tree of another height.
    #[error("snapshot height {found} does not match tree height {expected}")]
    HeightMismatch {
        /// Height of this build
        expected: u32,
        /// Height recorded in the snapshot
        found: u32,
    },
    /// A snapshot claims a publication for deposits the tree does not hold.
    #[error("published deposit count {published} exceeds tree deposit count {deposit_count}")]
    PublishedAheadOfTree {
        /// Deposit count behind the last published global exit root
        published: u64,
        /// Deposit count of the restored tree
        deposit_count: u64,
    },
    /// The shared bridge lock was poisoned by a panicking writer.
    #[error("bridge state lock poisoned")]
    LockPoisoned,
    /// Snapshot encoding failed.
    #[error("snapshot codec error: {0}")]
    Snapshot(#[from] bincode::Error),
    /// Event log encoding failed.
    #[error("event log codec error: {0}")]
    Json(#[from] serde_json::Error),
    /// Event log I/O failed.
    #[error("event log io error: {0}")]
    Io(#[from] std::io::Error),
}
