//! Bridge leaf encoding

use serde::{Deserialize, Serialize};
use xlayer_exit_tree::Keccak256Hasher;

use crate::types::{Address, Hash, LeafType, NetworkId, U256};

/// Length of the packed leaf preimage:
/// `uint8 | uint32 | address | uint32 | address | uint256 | bytes32`
pub const LEAF_ENCODED_LEN: usize = 1 + 4 + 20 + 4 + 20 + 32 + 32;

/// Metadata hash of a deposit without metadata (keccak256 of empty bytes)
pub const EMPTY_METADATA_HASH: Hash = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c,
    0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b,
    0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
];

/// Hash opaque deposit metadata. Only the hash enters the leaf.
pub fn metadata_hash(metadata: &[u8]) -> Hash {
    Keccak256Hasher::hash(metadata)
}

/// Everything a leaf commits to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafDescriptor {
    /// Asset or message
    pub leaf_type: LeafType,
    /// Network the asset (or message sender) originates from
    pub origin_network: NetworkId,
    /// Token contract for assets, sender for messages
    pub origin_address: Address,
    /// Network the deposit is bound for
    pub destination_network: NetworkId,
    /// Receiver on the destination network
    pub destination_address: Address,
    /// Token amount or native value
    pub amount: U256,
    /// keccak256 of the deposit metadata
    pub metadata_hash: Hash,
}

impl LeafDescriptor {
    /// Packed big-endian preimage of the leaf
    pub fn packed(&self) -> [u8; LEAF_ENCODED_LEN] {
        let mut out = [0u8; LEAF_ENCODED_LEN];
        let mut offset = 0;
        let mut put = |bytes: &[u8]| {
            out[offset..offset + bytes.len()].copy_from_slice(bytes);
            offset += bytes.len();
        };

        put(&[self.leaf_type.as_u8()]);
        put(&self.origin_network.to_be_bytes());
        put(self.origin_address.as_slice());
        put(&self.destination_network.to_be_bytes());
        put(self.destination_address.as_slice());
        put(&self.amount.to_be_bytes::<32>());
        put(&self.metadata_hash);

        out
    }

    /// Leaf hash inserted into the exit tree
    pub fn encode(&self) -> Hash {
        Keccak256Hasher::hash(&self.packed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> LeafDescriptor {
        LeafDescriptor {
            leaf_type: LeafType::Asset,
            origin_network: 0,
            origin_address: Address::repeat_byte(0xaa),
            destination_network: 1,
            destination_address: Address::repeat_byte(0xbb),
            amount: U256::from(10_000_000_000_000_000_000u128),
            metadata_hash: metadata_hash(b"token metadata"),
        }
    }

    #[test]
    fn test_empty_metadata_hash() {
        assert_eq!(metadata_hash(&[]), EMPTY_METADATA_HASH);
    }

    #[test]
    fn test_packed_layout() {
        let mut leaf = descriptor();
        leaf.leaf_type = LeafType::Message;
        leaf.origin_network = 0x0102_0304;
        leaf.destination_network = 7;
        leaf.amount = U256::from(0x1234u64);

        let packed = leaf.packed();

        assert_eq!(LEAF_ENCODED_LEN, 113);
        assert_eq!(packed[0], 1);
        assert_eq!(packed[1..5], [1, 2, 3, 4]);
        assert_eq!(packed[5..25], [0xaa; 20]);
        assert_eq!(packed[25..29], [0, 0, 0, 7]);
        assert_eq!(packed[29..49], [0xbb; 20]);
        assert_eq!(packed[49..79], [0u8; 30]);
        assert_eq!(packed[79..81], [0x12, 0x34]);
        assert_eq!(packed[81..], leaf.metadata_hash);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let leaf = descriptor();
        assert_eq!(leaf.encode(), leaf.clone().encode());
        assert_eq!(leaf.encode(), Keccak256Hasher::hash(&leaf.packed()));
    }

    #[test]
    fn test_every_field_changes_the_leaf() {
        let base = descriptor();
        let variants = [
            LeafDescriptor { leaf_type: LeafType::Message, ..base.clone() },
            LeafDescriptor { origin_network: 5, ..base.clone() },
            LeafDescriptor { origin_address: Address::ZERO, ..base.clone() },
            LeafDescriptor { destination_network: 2, ..base.clone() },
            LeafDescriptor { destination_address: Address::ZERO, ..base.clone() },
            LeafDescriptor { amount: U256::from(1u64), ..base.clone() },
            LeafDescriptor { metadata_hash: EMPTY_METADATA_HASH, ..base.clone() },
        ];

        for variant in &variants {
            assert_ne!(variant.encode(), base.encode(), "{variant:?}");
        }
    }
}
