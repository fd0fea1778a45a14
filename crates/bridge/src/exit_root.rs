//! Global exit root aggregation
//!
//! global_exit_root = H(local_exit_root || counterpart_exit_root)
//!
//! Publication is decoupled from insertion: many deposits can land in the exit tree
//! before one refresh folds the latest deposit root into a new global exit root.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use xlayer_exit_tree::{Keccak256Hasher, ZERO_HASH, format_hash_hex};

use crate::types::Hash;

/// Combine a local and a counterpart exit root
pub fn calculate_global_exit_root(local_exit_root: &Hash, counterpart_exit_root: &Hash) -> Hash {
    Keccak256Hasher::hash_pair(local_exit_root, counterpart_exit_root)
}

/// Result of a refresh
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Whether a new global exit root was published
    pub changed: bool,
    /// Global exit root after the refresh
    pub global_root: Hash,
}

/// Last published exit roots and the global root derived from them.
///
/// The aggregator is Stale while the local deposit count differs from the last
/// published one, and Synced otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalExitRootAggregator {
    last_local_exit_root: Hash,
    last_counterpart_exit_root: Hash,
    /// `None` until the first publication
    last_published_deposit_count: Option<u64>,
    global_root: Hash,
    /// Every published global root, with its publication sequence number
    published: HashMap<Hash, u64>,
    publications: u64,
}

impl GlobalExitRootAggregator {
    /// Create an aggregator that has not published yet
    pub fn new() -> Self {
        Self {
            last_local_exit_root: ZERO_HASH,
            last_counterpart_exit_root: ZERO_HASH,
            last_published_deposit_count: None,
            global_root: calculate_global_exit_root(&ZERO_HASH, &ZERO_HASH),
            published: HashMap::new(),
            publications: 0,
        }
    }

    /// Resume from persisted state.
    ///
    /// Publication history is not persisted; only the current global root is known
    /// as published afterwards.
    pub fn restore(
        last_local_exit_root: Hash,
        last_counterpart_exit_root: Hash,
        last_published_deposit_count: Option<u64>,
    ) -> Self {
        let mut aggregator = Self::new();
        aggregator.last_local_exit_root = last_local_exit_root;
        aggregator.last_counterpart_exit_root = last_counterpart_exit_root;
        aggregator.last_published_deposit_count = last_published_deposit_count;
        aggregator.global_root =
            calculate_global_exit_root(&last_local_exit_root, &last_counterpart_exit_root);
        if last_published_deposit_count.is_some() {
            aggregator.record_publication();
        }
        aggregator
    }

    /// Publish a new global exit root unless nothing changed since the last one.
    ///
    /// `local_root` and `local_deposit_count` must come from the same tree snapshot.
    pub fn refresh(
        &mut self,
        local_root: Hash,
        local_deposit_count: u64,
        counterpart_root: Hash,
    ) -> RefreshOutcome {
        if self.last_published_deposit_count == Some(local_deposit_count) &&
            self.last_counterpart_exit_root == counterpart_root
        {
            debug!(
                deposit_count = local_deposit_count,
                global_root = %format_hash_hex(&self.global_root),
                "No pending deposits, global exit root unchanged"
            );
            return RefreshOutcome { changed: false, global_root: self.global_root };
        }

        self.last_local_exit_root = local_root;
        self.last_published_deposit_count = Some(local_deposit_count);
        self.last_counterpart_exit_root = counterpart_root;
        self.global_root = calculate_global_exit_root(&local_root, &counterpart_root);
        self.record_publication();

        info!(
            deposit_count = local_deposit_count,
            local_exit_root = %format_hash_hex(&local_root),
            counterpart_exit_root = %format_hash_hex(&counterpart_root),
            global_root = %format_hash_hex(&self.global_root),
            "Updated global exit root"
        );

        RefreshOutcome { changed: true, global_root: self.global_root }
    }

    fn record_publication(&mut self) {
        self.publications += 1;
        self.published.entry(self.global_root).or_insert(self.publications);
    }

    /// Current global exit root
    pub const fn global_root(&self) -> Hash {
        self.global_root
    }

    /// Local exit root folded into the current global root
    pub const fn last_local_exit_root(&self) -> Hash {
        self.last_local_exit_root
    }

    /// Counterpart exit root folded into the current global root
    pub const fn last_counterpart_exit_root(&self) -> Hash {
        self.last_counterpart_exit_root
    }

    /// Deposit count behind [`Self::last_local_exit_root`], if anything was published
    pub const fn last_published_deposit_count(&self) -> Option<u64> {
        self.last_published_deposit_count
    }

    /// Whether deposits exist that the global root does not reflect yet
    pub fn is_stale(&self, deposit_count: u64) -> bool {
        self.last_published_deposit_count != Some(deposit_count)
    }

    /// Whether `global_root` was ever published by this aggregator
    pub fn is_published(&self, global_root: &Hash) -> bool {
        self.published.contains_key(global_root)
    }

    /// Publication sequence number of a global root (1-based)
    pub fn publication_index(&self, global_root: &Hash) -> Option<u64> {
        self.published.get(global_root).copied()
    }

    /// Number of publications so far
    pub const fn publication_count(&self) -> u64 {
        self.publications
    }
}

impl Default for GlobalExitRootAggregator {
    fn default() -> Self {
        Self::new()
    }
}
