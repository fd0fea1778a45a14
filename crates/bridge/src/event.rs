//! Bridge event ledger
//!
//! Every inserted leaf is published as a [`BridgeEvent`] carrying the full deposit and
//! its deposit count. The ordered events are sufficient to rebuild the exit tree
//! without access to the bridge's own state.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use xlayer_exit_tree::{IncrementalMerkleTree, MerkleProof, ReplayTree};

use crate::{
    error::BridgeError,
    leaf::{LeafDescriptor, metadata_hash},
    types::{Address, Bytes, Hash, LeafType, NetworkId, U256},
};

/// One committed deposit, as emitted by the bridge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// Asset or message
    pub leaf_type: LeafType,
    /// Origin network of the asset or sender
    pub origin_network: NetworkId,
    /// Token contract or sender
    pub origin_address: Address,
    /// Destination network
    pub destination_network: NetworkId,
    /// Receiver
    pub destination_address: Address,
    /// Token amount or native value
    pub amount: U256,
    /// Raw metadata; the leaf commits to its hash
    pub metadata: Bytes,
    /// Position of the leaf in the exit tree
    pub deposit_count: u64,
}

impl BridgeEvent {
    /// Leaf descriptor committed by this event
    pub fn descriptor(&self) -> LeafDescriptor {
        LeafDescriptor {
            leaf_type: self.leaf_type,
            origin_network: self.origin_network,
            origin_address: self.origin_address,
            destination_network: self.destination_network,
            destination_address: self.destination_address,
            amount: self.amount,
            metadata_hash: metadata_hash(&self.metadata),
        }
    }

    /// Leaf hash committed by this event
    pub fn leaf(&self) -> Hash {
        self.descriptor().encode()
    }
}

/// Leaf type byte of an event line, read on its own to classify decode failures
#[derive(Deserialize)]
struct RawLeafType {
    leaf_type: u8,
}

/// Decode one JSON event line. An unknown leaf type byte is reported as
/// [`BridgeError::UnknownLeafType`] rather than a generic codec error.
fn decode_event(line: &str) -> Result<BridgeEvent, BridgeError> {
    serde_json::from_str(line).map_err(|err| {
        serde_json::from_str::<RawLeafType>(line)
            .ok()
            .and_then(|raw| LeafType::try_from(raw.leaf_type).err())
            .unwrap_or(BridgeError::Json(err))
    })
}

/// Rebuild an exit tree from events in emission order.
///
/// Event `i` must carry deposit count `i`; gaps, duplicates and reordering are
/// rejected.
pub fn replay_events<'a>(
    events: impl IntoIterator<Item = &'a BridgeEvent>,
) -> Result<IncrementalMerkleTree, BridgeError> {
    let mut tree = IncrementalMerkleTree::new();
    for event in events {
        let expected = tree.deposit_count();
        if event.deposit_count != expected {
            return Err(BridgeError::EventOutOfOrder { expected, found: event.deposit_count });
        }
        tree.insert(event.leaf())?;
    }
    Ok(tree)
}

/// Ordered, gap-free run of bridge events
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    /// Deposit count of the first held event
    first_deposit_count: u64,
    events: Vec<BridgeEvent>,
}

impl EventLog {
    /// Create an empty log starting at deposit count 0
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an empty log whose first event will carry `deposit_count`
    pub const fn starting_at(deposit_count: u64) -> Self {
        Self { first_deposit_count: deposit_count, events: Vec::new() }
    }

    /// Deposit count the next event must carry
    pub fn next_deposit_count(&self) -> u64 {
        self.first_deposit_count + self.events.len() as u64
    }

    /// Deposit count of the first held event
    pub const fn first_deposit_count(&self) -> u64 {
        self.first_deposit_count
    }

    /// Append an event
    pub fn push(&mut self, event: BridgeEvent) -> Result<(), BridgeError> {
        let expected = self.next_deposit_count();
        if event.deposit_count != expected {
            return Err(BridgeError::EventOutOfOrder { expected, found: event.deposit_count });
        }
        self.events.push(event);
        Ok(())
    }

    /// Event recorded for a deposit count
    pub fn get(&self, deposit_count: u64) -> Option<&BridgeEvent> {
        let offset = deposit_count.checked_sub(self.first_deposit_count)?;
        self.events.get(usize::try_from(offset).ok()?)
    }

    /// Number of held events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate events in order
    pub fn iter(&self) -> std::slice::Iter<'_, BridgeEvent> {
        self.events.iter()
    }

    /// Rebuild the exit tree. Only a log starting at deposit count 0 is replayable.
    pub fn replay(&self) -> Result<IncrementalMerkleTree, BridgeError> {
        self.ensure_complete()?;
        replay_events(&self.events)
    }

    /// Generate an inclusion proof for a deposit by replaying every leaf
    pub fn proof(&self, deposit_count: u64) -> Result<MerkleProof, BridgeError> {
        self.ensure_complete()?;
        let tree = ReplayTree::from_leaves(self.events.iter().map(BridgeEvent::leaf))?;
        tree.proof(deposit_count).ok_or(BridgeError::UnknownDeposit(deposit_count))
    }

    /// Write one JSON object per line
    pub fn write_json_lines<W: Write>(&self, mut writer: W) -> Result<(), BridgeError> {
        for event in &self.events {
            serde_json::to_writer(&mut writer, event)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a log written by [`EventLog::write_json_lines`]. Blank lines are skipped.
    pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Self, BridgeError> {
        let mut log = Self::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            log.push(decode_event(&line)?)?;
        }
        Ok(log)
    }

    fn ensure_complete(&self) -> Result<(), BridgeError> {
        if self.first_deposit_count != 0 {
            return Err(BridgeError::EventOutOfOrder {
                expected: 0,
                found: self.first_deposit_count,
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a BridgeEvent;
    type IntoIter = std::slice::Iter<'a, BridgeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
