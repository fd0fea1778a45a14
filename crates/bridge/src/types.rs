//! Common types

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

pub use alloy_primitives::{Address, Bytes, U256};
pub use xlayer_exit_tree::Hash;

/// Network identifier
pub type NetworkId = u32;

/// Network id of the L1 side of the bridge
pub const MAINNET_NETWORK_ID: NetworkId = 0;

/// Kind of bridging operation a leaf records. Serialized as its leaf byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LeafType {
    /// Token or native asset transfer
    Asset = 0,
    /// Arbitrary message with optional native value
    Message = 1,
}

impl LeafType {
    /// Byte written into the leaf encoding
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LeafType {
    type Error = BridgeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Asset),
            1 => Ok(Self::Message),
            other => Err(BridgeError::UnknownLeafType(other)),
        }
    }
}

impl From<LeafType> for u8 {
    fn from(leaf_type: LeafType) -> Self {
        leaf_type.as_u8()
    }
}
