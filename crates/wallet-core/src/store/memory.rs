use chain_btc::Coin;

use super::{DepthStore, StoreError, StoreState};
use crate::types::{ChainDepths, ChainType};

/// In-process store for tests and ephemeral wallets.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: StoreState,
    closed: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted depths.
    pub fn with_depths(depths: ChainDepths) -> Self {
        Self {
            state: StoreState {
                depths,
                ..Default::default()
            },
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl DepthStore for MemoryStore {
    fn depth(&self, chain: ChainType) -> Result<u32, StoreError> {
        self.ensure_open()?;
        Ok(self.state.depths.get(chain))
    }

    fn set_depth(&mut self, chain: ChainType, depth: u32) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.state.depths.set(chain, depth);
        Ok(())
    }

    fn coins(&self) -> Result<Vec<Coin>, StoreError> {
        self.ensure_open()?;
        Ok(self.state.coins.values().cloned().collect())
    }

    fn merge_coins(&mut self, coins: &[Coin]) -> Result<usize, StoreError> {
        self.ensure_open()?;
        Ok(self.state.merge_coins(coins))
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::coin;

    #[test]
    fn fresh_store_defaults_to_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.receive_depth().unwrap(), 0);
        assert_eq!(store.change_depth().unwrap(), 0);
        assert!(store.coins().unwrap().is_empty());
    }

    #[test]
    fn commit_scan_updates_depth_and_coins() {
        let mut store = MemoryStore::new();
        let added = store
            .commit_scan(ChainType::Receive, 3, &[coin(1, 0, "a"), coin(2, 0, "b")])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.receive_depth().unwrap(), 3);
        assert_eq!(store.change_depth().unwrap(), 0);

        let again = store.commit_scan(ChainType::Receive, 3, &[coin(1, 0, "a")]).unwrap();
        assert_eq!(again, 0);
        assert_eq!(store.coins().unwrap().len(), 2);
    }

    #[test]
    fn closed_store_rejects_calls() {
        let mut store = MemoryStore::with_depths(ChainDepths { receive: 5, change: 1 });
        assert_eq!(store.receive_depth().unwrap(), 5);
        store.close().unwrap();
        assert!(store.is_closed());
        assert!(matches!(store.receive_depth(), Err(StoreError::Closed)));
        assert!(matches!(store.set_change_depth(2), Err(StoreError::Closed)));
    }
}
