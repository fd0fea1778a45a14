//! X Layer bridge core
//!
//! This crate turns bridging operations into exit tree leaves and keeps the global
//! exit root in sync:
//! - Leaf encoding: a deposit descriptor packed and hashed with keccak256
//! - Event ledger: every leaf is emitted with its deposit count and can be replayed
//! - Global exit root: local and counterpart exit roots, republished only when stale
//! - Claims: counterpart deposits verified against published global exit roots

pub mod bridge;
pub mod claim;
pub mod config;
pub mod error;
pub mod event;
pub mod exit_root;
pub mod leaf;
pub mod shared;
pub mod snapshot;
pub mod types;

pub use bridge::{AssetDeposit, Bridge, DepositReceipt, MessageDeposit};
pub use claim::{Claim, ClaimTracker};
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use event::{BridgeEvent, EventLog, replay_events};
pub use exit_root::{GlobalExitRootAggregator, RefreshOutcome, calculate_global_exit_root};
pub use leaf::{EMPTY_METADATA_HASH, LEAF_ENCODED_LEN, LeafDescriptor, metadata_hash};
pub use shared::SharedBridge;
pub use snapshot::BridgeSnapshot;
pub use types::*;

pub use xlayer_exit_tree as exit_tree;
