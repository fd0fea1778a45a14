//! Bridge deposit flow
//!
//! Validates a deposit, encodes its leaf, appends it to the exit tree, emits the
//! bridge event and optionally publishes a new global exit root in the same step.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use xlayer_exit_tree::{IncrementalMerkleTree, ZERO_HASH, format_hash_hex};

use crate::{
    claim::{Claim, ClaimTracker},
    config::BridgeConfig,
    error::BridgeError,
    event::{BridgeEvent, EventLog},
    exit_root::{GlobalExitRootAggregator, RefreshOutcome},
    snapshot::BridgeSnapshot,
    types::{Address, Bytes, Hash, LeafType, NetworkId, U256},
};

/// Asset deposit request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDeposit {
    /// Network the token was issued on
    pub origin_network: NetworkId,
    /// Token contract on its origin network; zero for the native asset
    pub origin_token: Address,
    /// Destination network
    pub destination_network: NetworkId,
    /// Receiver on the destination network
    pub destination_address: Address,
    /// Amount bridged
    pub amount: U256,
    /// Token metadata, empty for the native asset
    pub metadata: Bytes,
}

/// Message deposit request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeposit {
    /// Message sender on this network
    pub sender: Address,
    /// Destination network
    pub destination_network: NetworkId,
    /// Receiver on the destination network
    pub destination_address: Address,
    /// Native value attached to the message
    pub value: U256,
    /// Message payload
    pub metadata: Bytes,
}

/// What a committed deposit produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositReceipt {
    /// Deposit count assigned to the leaf (its index in the exit tree)
    pub deposit_count: u64,
    /// Leaf hash
    pub leaf: Hash,
    /// Exit tree root after insertion
    pub deposit_root: Hash,
    /// Outcome of the global exit root refresh, when one was forced
    pub global_exit_root_update: Option<RefreshOutcome>,
}

/// One network's side of the bridge
#[derive(Clone, Debug)]
pub struct Bridge {
    config: BridgeConfig,
    tree: IncrementalMerkleTree,
    aggregator: GlobalExitRootAggregator,
    events: EventLog,
    claims: ClaimTracker,
    /// Latest exit root observed from the counterpart network
    counterpart_exit_root: Hash,
}

impl Bridge {
    /// Create a bridge with an empty exit tree
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            tree: IncrementalMerkleTree::new(),
            aggregator: GlobalExitRootAggregator::new(),
            events: EventLog::new(),
            claims: ClaimTracker::new(config.network_id),
            counterpart_exit_root: ZERO_HASH,
            config,
        }
    }

    /// Resume from a snapshot. The event log restarts at the snapshot's deposit count.
    pub fn restore(config: BridgeConfig, snapshot: &BridgeSnapshot) -> Result<Self, BridgeError> {
        let tree = snapshot.tree()?;
        let aggregator = snapshot.aggregator()?;
        info!(
            deposit_count = tree.deposit_count(),
            deposit_root = %format_hash_hex(&tree.root()),
            "Restored bridge from snapshot"
        );

        Ok(Self {
            events: EventLog::starting_at(tree.deposit_count()),
            tree,
            aggregator,
            claims: ClaimTracker::restore(config.network_id, snapshot.claimed.iter().copied()),
            counterpart_exit_root: snapshot.counterpart_exit_root,
            config,
        })
    }

    /// Bridge an asset
    pub fn bridge_asset(
        &mut self,
        deposit: AssetDeposit,
        force_update: bool,
    ) -> Result<DepositReceipt, BridgeError> {
        self.check_destination(deposit.destination_network)?;

        let event = BridgeEvent {
            leaf_type: LeafType::Asset,
            origin_network: deposit.origin_network,
            origin_address: deposit.origin_token,
            destination_network: deposit.destination_network,
            destination_address: deposit.destination_address,
            amount: deposit.amount,
            metadata: deposit.metadata,
            deposit_count: self.tree.deposit_count(),
        };
        self.commit(event, force_update)
    }

    /// Bridge a message. The origin network is always this network.
    pub fn bridge_message(
        &mut self,
        deposit: MessageDeposit,
        force_update: bool,
    ) -> Result<DepositReceipt, BridgeError> {
        self.check_destination(deposit.destination_network)?;

        let event = BridgeEvent {
            leaf_type: LeafType::Message,
            origin_network: self.config.network_id,
            origin_address: deposit.sender,
            destination_network: deposit.destination_network,
            destination_address: deposit.destination_address,
            amount: deposit.value,
            metadata: deposit.metadata,
            deposit_count: self.tree.deposit_count(),
        };
        self.commit(event, force_update)
    }

    fn check_destination(&self, destination: NetworkId) -> Result<(), BridgeError> {
        if self.config.is_valid_destination(destination) {
            return Ok(());
        }
        warn!(network_id = self.config.network_id, destination, "Rejected deposit to invalid network");
        Err(BridgeError::DestinationNetworkInvalid {
            network_id: self.config.network_id,
            destination,
        })
    }

    fn commit(
        &mut self,
        event: BridgeEvent,
        force_update: bool,
    ) -> Result<DepositReceipt, BridgeError> {
        if self.config.retain_events && self.events.next_deposit_count() != event.deposit_count {
            return Err(BridgeError::EventOutOfOrder {
                expected: self.events.next_deposit_count(),
                found: event.deposit_count,
            });
        }

        let leaf = event.leaf();
        let (_, deposit_root) = self.tree.insert(leaf)?;

        info!(
            target: "bridge_event",
            leaf_type = ?event.leaf_type,
            origin_network = event.origin_network,
            origin_address = %event.origin_address,
            destination_network = event.destination_network,
            destination_address = %event.destination_address,
            amount = %event.amount,
            metadata = %hex::encode(&event.metadata),
            deposit_count = event.deposit_count,
            "BridgeEvent"
        );
        debug!(
            leaf = %format_hash_hex(&leaf),
            deposit_root = %format_hash_hex(&deposit_root),
            "Inserted exit tree leaf"
        );

        let deposit_count = event.deposit_count;
        if self.config.retain_events {
            self.events.push(event)?;
        }

        let global_exit_root_update = force_update.then(|| self.update_global_exit_root());

        Ok(DepositReceipt { deposit_count, leaf, deposit_root, global_exit_root_update })
    }

    /// Fold the current deposit root and counterpart exit root into the global exit root
    pub fn update_global_exit_root(&mut self) -> RefreshOutcome {
        self.aggregator.refresh(
            self.tree.root(),
            self.tree.deposit_count(),
            self.counterpart_exit_root,
        )
    }

    /// Record the latest counterpart exit root. Takes effect at the next refresh.
    pub fn set_counterpart_exit_root(&mut self, root: Hash) {
        debug!(counterpart_exit_root = %format_hash_hex(&root), "Observed counterpart exit root");
        self.counterpart_exit_root = root;
    }

    /// Claim a counterpart deposit destined for this network
    pub fn claim(&mut self, claim: &Claim) -> Result<Hash, BridgeError> {
        self.claims.claim(claim, &self.aggregator)
    }

    /// Current exit tree root
    pub const fn deposit_root(&self) -> Hash {
        self.tree.root()
    }

    /// Number of deposits so far
    pub const fn deposit_count(&self) -> u64 {
        self.tree.deposit_count()
    }

    /// Current global exit root
    pub const fn global_exit_root(&self) -> Hash {
        self.aggregator.global_root()
    }

    /// Whether deposits are waiting for a global exit root update
    pub fn is_stale(&self) -> bool {
        self.aggregator.is_stale(self.tree.deposit_count())
    }

    /// Latest observed counterpart exit root
    pub const fn counterpart_exit_root(&self) -> Hash {
        self.counterpart_exit_root
    }

    /// Exit tree
    pub const fn tree(&self) -> &IncrementalMerkleTree {
        &self.tree
    }

    /// Global exit root state
    pub const fn aggregator(&self) -> &GlobalExitRootAggregator {
        &self.aggregator
    }

    /// Claim state
    pub const fn claims(&self) -> &ClaimTracker {
        &self.claims
    }

    /// Retained bridge events
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// Network this bridge runs on
    pub const fn network_id(&self) -> NetworkId {
        self.config.network_id
    }

    /// Bridge configuration
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Capture the persistent state
    pub fn snapshot(&self) -> BridgeSnapshot {
        BridgeSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{EMPTY_METADATA_HASH, LeafDescriptor, metadata_hash};
    use xlayer_exit_tree::{Keccak256Hasher, TREE_HEIGHT, zero_hashes};

    const TEN_ETHER: u128 = 10_000_000_000_000_000_000;

    fn token() -> Address {
        Address::repeat_byte(0x7a)
    }

    fn receiver() -> Address {
        Address::repeat_byte(0xd0)
    }

    fn asset(metadata: &'static [u8]) -> AssetDeposit {
        AssetDeposit {
            origin_network: 0,
            origin_token: token(),
            destination_network: 1,
            destination_address: receiver(),
            amount: U256::from(TEN_ETHER),
            metadata: Bytes::from_static(metadata),
        }
    }

    #[test]
    fn test_bridge_asset_root() {
        let mut bridge = Bridge::new(BridgeConfig::default());
        let receipt = bridge.bridge_asset(asset(b"Matic Token"), false).unwrap();

        let descriptor = LeafDescriptor {
            leaf_type: LeafType::Asset,
            origin_network: 0,
            origin_address: token(),
            destination_network: 1,
            destination_address: receiver(),
            amount: U256::from(TEN_ETHER),
            metadata_hash: metadata_hash(b"Matic Token"),
        };
        let mut expected = descriptor.encode();
        for zero in zero_hashes().iter().take(TREE_HEIGHT) {
            expected = Keccak256Hasher::hash_pair(&expected, zero);
        }

        assert_eq!(receipt.deposit_count, 0);
        assert_eq!(receipt.leaf, descriptor.encode());
        assert_eq!(receipt.deposit_root, expected);
        assert_eq!(bridge.deposit_count(), 1);
        assert_eq!(bridge.deposit_root(), expected);
        assert_eq!(receipt.global_exit_root_update, None);
        assert!(bridge.is_stale());
    }

    #[test]
    fn test_bridge_message_uses_own_network() {
        let config = BridgeConfig { network_id: 1, ..BridgeConfig::default() };
        let mut bridge = Bridge::new(config);

        let receipt = bridge
            .bridge_message(
                MessageDeposit {
                    sender: Address::repeat_byte(0x55),
                    destination_network: 0,
                    destination_address: receiver(),
                    value: U256::ZERO,
                    metadata: Bytes::new(),
                },
                true,
            )
            .unwrap();

        let event = bridge.events().get(0).unwrap();
        assert_eq!(event.leaf_type, LeafType::Message);
        assert_eq!(event.origin_network, 1);
        assert_eq!(event.descriptor().metadata_hash, EMPTY_METADATA_HASH);
        assert!(receipt.global_exit_root_update.unwrap().changed);
        assert!(!bridge.is_stale());
    }

    #[test]
    fn test_invalid_destination_leaves_state_untouched() {
        let mut bridge = Bridge::new(BridgeConfig::default());

        for destination in [0, 2] {
            let deposit = AssetDeposit { destination_network: destination, ..asset(b"") };
            let err = bridge.bridge_asset(deposit, true).unwrap_err();
            assert!(matches!(err, BridgeError::DestinationNetworkInvalid { .. }));
        }

        assert_eq!(bridge.deposit_count(), 0);
        assert!(bridge.events().is_empty());
        assert_eq!(bridge.aggregator().last_published_deposit_count(), None);
    }

    #[test]
    fn test_forced_update_publishes() {
        let mut bridge = Bridge::new(BridgeConfig::default());
        bridge.set_counterpart_exit_root([9u8; 32]);

        let receipt = bridge.bridge_asset(asset(b""), true).unwrap();
        let update = receipt.global_exit_root_update.unwrap();

        assert!(update.changed);
        assert_eq!(update.global_root, bridge.global_exit_root());
        assert_eq!(bridge.aggregator().last_local_exit_root(), receipt.deposit_root);
        assert_eq!(bridge.aggregator().last_counterpart_exit_root(), [9u8; 32]);
    }

    #[test]
    fn test_events_not_retained() {
        let config = BridgeConfig { retain_events: false, ..BridgeConfig::default() };
        let mut bridge = Bridge::new(config);

        bridge.bridge_asset(asset(b""), false).unwrap();
        bridge.bridge_asset(asset(b""), false).unwrap();

        assert_eq!(bridge.deposit_count(), 2);
        assert!(bridge.events().is_empty());
    }
}
