//! Durable depth and coin records.
//!
//! [`DepthStore`] is the capability the wallet persists through. The store is
//! the source of truth across restarts; the wallet's in-memory depths and
//! coins are a cache rebuilt from it.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;

use chain_btc::{Coin, OutPoint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChainDepths, ChainType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store is closed")]
    Closed,

    #[error("corrupt store: {0}")]
    Corrupt(String),
}

pub trait DepthStore: Send {
    /// Depth of `chain`, 0 if never set.
    fn depth(&self, chain: ChainType) -> Result<u32, StoreError>;

    /// Durable before returning.
    fn set_depth(&mut self, chain: ChainType, depth: u32) -> Result<(), StoreError>;

    fn coins(&self) -> Result<Vec<Coin>, StoreError>;

    /// Insert coins not already recorded under the same `(txid, vout)`.
    /// Returns how many were new.
    fn merge_coins(&mut self, coins: &[Coin]) -> Result<usize, StoreError>;

    /// Record a finished scan: merge `coins` and set the depth of `chain`.
    ///
    /// Backends that can write both in one step override this. The default
    /// writes coins first, so a failure leaves the old depth in place and a
    /// retried scan re-merges the same coins harmlessly.
    fn commit_scan(&mut self, chain: ChainType, depth: u32, coins: &[Coin]) -> Result<usize, StoreError> {
        let added = self.merge_coins(coins)?;
        self.set_depth(chain, depth)?;
        Ok(added)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release the store. Later calls fail with [`StoreError::Closed`].
    fn close(&mut self) -> Result<(), StoreError>;

    fn receive_depth(&self) -> Result<u32, StoreError> {
        self.depth(ChainType::Receive)
    }

    fn change_depth(&self) -> Result<u32, StoreError> {
        self.depth(ChainType::Change)
    }

    fn set_receive_depth(&mut self, depth: u32) -> Result<(), StoreError> {
        self.set_depth(ChainType::Receive, depth)
    }

    fn set_change_depth(&mut self, depth: u32) -> Result<(), StoreError> {
        self.set_depth(ChainType::Change, depth)
    }
}

impl<S: DepthStore + ?Sized> DepthStore for Box<S> {
    fn depth(&self, chain: ChainType) -> Result<u32, StoreError> {
        (**self).depth(chain)
    }

    fn set_depth(&mut self, chain: ChainType, depth: u32) -> Result<(), StoreError> {
        (**self).set_depth(chain, depth)
    }

    fn coins(&self) -> Result<Vec<Coin>, StoreError> {
        (**self).coins()
    }

    fn merge_coins(&mut self, coins: &[Coin]) -> Result<usize, StoreError> {
        (**self).merge_coins(coins)
    }

    fn commit_scan(&mut self, chain: ChainType, depth: u32, coins: &[Coin]) -> Result<usize, StoreError> {
        (**self).commit_scan(chain, depth, coins)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), StoreError> {
        (**self).close()
    }
}

/// Records shared by the backends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StoreState {
    pub depths: ChainDepths,
    pub coins: BTreeMap<OutPoint, Coin>,
}

impl StoreState {
    pub fn merge_coins(&mut self, coins: &[Coin]) -> usize {
        let mut added = 0;
        for coin in coins {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.coins.entry(coin.outpoint()) {
                slot.insert(coin.clone());
                added += 1;
            }
        }
        added
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            version: Snapshot::VERSION,
            depths: self.depths,
            coins: self.coins.values().cloned().collect(),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        if snapshot.version != Snapshot::VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        let mut state = StoreState {
            depths: snapshot.depths,
            coins: BTreeMap::new(),
        };
        state.merge_coins(&snapshot.coins);
        Ok(state)
    }
}

/// On-disk layout of [`FileStore`].
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub version: u32,
    pub depths: ChainDepths,
    pub coins: Vec<Coin>,
}

impl Snapshot {
    pub const VERSION: u32 = 1;
}
