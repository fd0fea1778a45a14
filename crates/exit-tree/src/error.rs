use thiserror::Error;

use crate::Hash;

/// Errors raised by tree mutation and restoration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Every leaf position is already taken.
    #[error("exit tree is full: all {capacity} leaf positions are used")]
    CapacityExceeded {
        /// Maximum number of leaves
        capacity: u64,
    },
    /// A persisted deposit count is larger than the tree can hold.
    #[error("deposit count {deposit_count} exceeds tree capacity {capacity}")]
    InvalidDepositCount {
        /// Deposit count that was supplied
        deposit_count: u64,
        /// Maximum number of leaves
        capacity: u64,
    },
    /// The root recomputed from a persisted frontier differs from the persisted root.
    #[error(
        "persisted root 0x{} does not match frontier root 0x{}",
        hex::encode(.expected),
        hex::encode(.computed)
    )]
    RootMismatch {
        /// Root that was supplied
        expected: Hash,
        /// Root derived from the frontier
        computed: Hash,
    },
}

/// Errors raised by proof verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    /// The authentication path does not have one sibling per level.
    #[error("proof must contain {expected} siblings, got {actual}")]
    InvalidProofLength {
        /// Required number of siblings
        expected: usize,
        /// Number of siblings supplied
        actual: usize,
    },
}
