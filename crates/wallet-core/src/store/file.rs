use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chain_btc::Coin;

use super::{DepthStore, Snapshot, StoreError, StoreState};
use crate::types::ChainType;

const SNAPSHOT_FILE: &str = "wallet.json";
const SNAPSHOT_TMP_FILE: &str = "wallet.json.tmp";

/// JSON snapshot store rooted at a directory.
///
/// Every update rewrites the whole snapshot through a temp file that is
/// fsynced and renamed over the previous one, so readers never see a torn
/// file and a failed write leaves the previous state intact on disk and in
/// memory.
#[derive(Debug)]
pub struct FileStore {
    location: PathBuf,
    state: StoreState,
    closed: bool,
}

impl FileStore {
    /// Open (or create) the store at `location`.
    pub fn open(location: impl AsRef<Path>) -> Result<Self, StoreError> {
        let location = location.as_ref().to_path_buf();
        fs::create_dir_all(&location)?;

        let path = location.join(SNAPSHOT_FILE);
        let state = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_json::from_str(&contents)?;
            StoreState::from_snapshot(snapshot)?
        } else {
            StoreState::default()
        };

        log::debug!(
            "Opened wallet store at {:?} (receive depth {}, change depth {}, {} coins)",
            location,
            state.depths.receive,
            state.depths.change,
            state.coins.len()
        );

        Ok(Self {
            location,
            state,
            closed: false,
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    /// Apply `change` to a copy of the state, persist it, then adopt it.
    fn update<T>(&mut self, change: impl FnOnce(&mut StoreState) -> T) -> Result<T, StoreError> {
        self.ensure_open()?;
        let mut next = self.state.clone();
        let out = change(&mut next);
        if next != self.state {
            self.write_snapshot(&next)?;
            self.state = next;
        }
        Ok(out)
    }

    fn write_snapshot(&self, state: &StoreState) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&state.to_snapshot())?;
        let tmp = self.location.join(SNAPSHOT_TMP_FILE);

        let mut file = fs::File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, self.location.join(SNAPSHOT_FILE))?;
        Ok(())
    }
}

impl DepthStore for FileStore {
    fn depth(&self, chain: ChainType) -> Result<u32, StoreError> {
        self.ensure_open()?;
        Ok(self.state.depths.get(chain))
    }

    fn set_depth(&mut self, chain: ChainType, depth: u32) -> Result<(), StoreError> {
        self.update(|state| state.depths.set(chain, depth))
    }

    fn coins(&self) -> Result<Vec<Coin>, StoreError> {
        self.ensure_open()?;
        Ok(self.state.coins.values().cloned().collect())
    }

    fn merge_coins(&mut self, coins: &[Coin]) -> Result<usize, StoreError> {
        self.update(|state| state.merge_coins(coins))
    }

    fn commit_scan(&mut self, chain: ChainType, depth: u32, coins: &[Coin]) -> Result<usize, StoreError> {
        self.update(|state| {
            let added = state.merge_coins(coins);
            state.depths.set(chain, depth);
            added
        })
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.closed = true;
        log::debug!("Closed wallet store at {:?}", self.location);
        Ok(())
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                log::warn!("Failed to close wallet store at {:?}: {}", self.location, e);
            }
        }
    }
}
