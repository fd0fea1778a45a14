//! Configuration

use serde::{Deserialize, Serialize};
use std::env;

use crate::types::{MAINNET_NETWORK_ID, NetworkId};

/// Bridge configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Network this bridge instance runs on
    pub network_id: NetworkId,
    /// Number of networks connected by the bridge; valid ids are `0..network_count`
    pub network_count: NetworkId,
    /// Keep emitted events in memory for replay and proof generation
    pub retain_events: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { network_id: MAINNET_NETWORK_ID, network_count: 2, retain_events: true }
    }
}

impl BridgeConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            network_id: env::var("NETWORK_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.network_id),
            network_count: env::var("NETWORK_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.network_count),
            retain_events: env::var("RETAIN_EVENTS")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(defaults.retain_events),
        }
    }

    /// Whether deposits from this network may target `destination`
    pub const fn is_valid_destination(&self, destination: NetworkId) -> bool {
        destination != self.network_id && destination < self.network_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_rules() {
        let config = BridgeConfig::default();
        assert!(config.is_valid_destination(1));
        assert!(!config.is_valid_destination(0));
        assert!(!config.is_valid_destination(2));

        let rollup = BridgeConfig { network_id: 1, ..BridgeConfig::default() };
        assert!(rollup.is_valid_destination(0));
        assert!(!rollup.is_valid_destination(1));
    }
}
