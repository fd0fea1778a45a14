//! Thread-safe bridge handle
//!
//! All mutations of one bridge go through a single mutex, so deposits are ordered by
//! lock acquisition and a refresh always reads a root and deposit count taken from
//! the same tree state.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    bridge::{AssetDeposit, Bridge, DepositReceipt, MessageDeposit},
    claim::Claim,
    error::BridgeError,
    exit_root::RefreshOutcome,
    snapshot::BridgeSnapshot,
    types::Hash,
};

/// Cloneable handle to a bridge shared between threads
#[derive(Clone, Debug)]
pub struct SharedBridge {
    inner: Arc<Mutex<Bridge>>,
}

impl SharedBridge {
    /// Wrap a bridge
    pub fn new(bridge: Bridge) -> Self {
        Self { inner: Arc::new(Mutex::new(bridge)) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Bridge>, BridgeError> {
        self.inner.lock().map_err(|_| BridgeError::LockPoisoned)
    }

    /// Bridge an asset
    pub fn bridge_asset(
        &self,
        deposit: AssetDeposit,
        force_update: bool,
    ) -> Result<DepositReceipt, BridgeError> {
        self.lock()?.bridge_asset(deposit, force_update)
    }

    /// Bridge a message
    pub fn bridge_message(
        &self,
        deposit: MessageDeposit,
        force_update: bool,
    ) -> Result<DepositReceipt, BridgeError> {
        self.lock()?.bridge_message(deposit, force_update)
    }

    /// Refresh the global exit root
    pub fn update_global_exit_root(&self) -> Result<RefreshOutcome, BridgeError> {
        Ok(self.lock()?.update_global_exit_root())
    }

    /// Record the latest counterpart exit root
    pub fn set_counterpart_exit_root(&self, root: Hash) -> Result<(), BridgeError> {
        self.lock()?.set_counterpart_exit_root(root);
        Ok(())
    }

    /// Claim a counterpart deposit
    pub fn claim(&self, claim: &Claim) -> Result<Hash, BridgeError> {
        self.lock()?.claim(claim)
    }

    /// Deposit count and root read under one lock
    pub fn deposit_state(&self) -> Result<(u64, Hash), BridgeError> {
        let bridge = self.lock()?;
        Ok((bridge.deposit_count(), bridge.deposit_root()))
    }

    /// Current global exit root
    pub fn global_exit_root(&self) -> Result<Hash, BridgeError> {
        Ok(self.lock()?.global_exit_root())
    }

    /// Capture the persistent state
    pub fn snapshot(&self) -> Result<BridgeSnapshot, BridgeError> {
        Ok(self.lock()?.snapshot())
    }

    /// Run a read-only closure against the bridge
    pub fn with_bridge<R>(&self, f: impl FnOnce(&Bridge) -> R) -> Result<R, BridgeError> {
        Ok(f(&*self.lock()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BridgeConfig,
        types::{Address, Bytes, U256},
    };
    use std::thread;

    #[test]
    fn test_concurrent_deposits_are_serialized() {
        let shared = SharedBridge::new(Bridge::new(BridgeConfig::default()));

        let handles: Vec<_> = (0..4u8)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25u64 {
                        let deposit = AssetDeposit {
                            origin_network: 0,
                            origin_token: Address::repeat_byte(worker),
                            destination_network: 1,
                            destination_address: Address::repeat_byte(0xee),
                            amount: U256::from(i),
                            metadata: Bytes::new(),
                        };
                        shared.bridge_asset(deposit, i % 10 == 0).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let (count, root) = shared.deposit_state().unwrap();
        assert_eq!(count, 100);

        let replayed = shared.with_bridge(|bridge| bridge.events().replay()).unwrap().unwrap();
        assert_eq!(replayed.deposit_count(), count);
        assert_eq!(replayed.root(), root);

        let outcome = shared.update_global_exit_root().unwrap();
        assert_eq!(outcome.global_root, shared.global_exit_root().unwrap());
    }

    #[test]
    fn test_poisoned_lock() {
        let shared = SharedBridge::new(Bridge::new(BridgeConfig::default()));
        let poisoner = shared.clone();

        let _ = thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("writer died");
        })
        .join();

        assert!(matches!(shared.deposit_state(), Err(BridgeError::LockPoisoned)));
    }
}
