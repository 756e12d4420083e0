//! Shared fixtures for wallet discovery integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use wallet_core::mnemonic::mnemonic_to_seed;
use wallet_core::store::MemoryStore;
use wallet_core::{
    Bip84Deriver, BtcNetwork, ChainDataSource, ChainType, Coin, CoinStatus, DepthStore,
    KeyDerivationProvider, QueryError, StoreError, WalletConfig,
};

pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Regtest addresses on `m/84'/0'/0'/{branch}/{index}`.
pub fn deriver() -> Bip84Deriver {
    Bip84Deriver::new(BtcNetwork::Regtest).with_coin_type(0)
}

pub fn config(gap_limit: u32) -> WalletConfig {
    WalletConfig {
        gap_limit,
        coin_type: Some(0),
        ..Default::default()
    }
}

pub fn derive_address(chain: ChainType, index: u32) -> String {
    let seed = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
    deriver().derive_address(&seed, chain, index).unwrap()
}

pub fn used(indices: &[(ChainType, u32)]) -> HashSet<String> {
    indices
        .iter()
        .map(|&(chain, index)| derive_address(chain, index))
        .collect()
}

/// Chain-data double: a fixed set of funded addresses, an optional failure on
/// the N-th `get_utxos` call or on the first query for one address, and a log
/// of probed addresses.
pub struct MockChainSource {
    used: HashSet<String>,
    fail_on_call: Option<usize>,
    fail_on_address: Option<String>,
    address_failed: AtomicBool,
    calls: AtomicUsize,
    probed: Mutex<Vec<String>>,
}

impl MockChainSource {
    pub fn new(used: HashSet<String>) -> Self {
        Self {
            used,
            fail_on_call: None,
            fail_on_address: None,
            address_failed: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Fail the first query for `address` only; call order does not matter.
    pub fn failing_once_on(mut self, address: String) -> Self {
        self.fail_on_address = Some(address);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainDataSource for MockChainSource {
    fn network(&self) -> BtcNetwork {
        BtcNetwork::Regtest
    }

    async fn get_latest_block_height(&self) -> Result<u32, QueryError> {
        Ok(0)
    }

    async fn get_latest_block_hash(&self) -> Result<String, QueryError> {
        Ok("0".repeat(64))
    }

    async fn get_block_hash(&self, _height: u32) -> Result<String, QueryError> {
        Ok("0".repeat(64))
    }

    async fn get_utxos(&self, address: &str) -> Result<Vec<Coin>, QueryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(QueryError::Backend(format!("injected failure on call {call}")));
        }
        if self.fail_on_address.as_deref() == Some(address)
            && !self.address_failed.swap(true, Ordering::SeqCst)
        {
            return Err(QueryError::Backend(format!("injected failure for {address}")));
        }
        self.probed.lock().unwrap().push(address.to_string());

        if !self.used.contains(address) {
            return Ok(Vec::new());
        }
        // Distinct txid per address so coins never collide on (txid, vout).
        let txid = format!("{:0>64}", hex::encode(&address.as_bytes()[address.len() - 8..]));
        Ok(vec![Coin {
            txid,
            vout: 0,
            value: 1000,
            address: address.to_string(),
            status: CoinStatus::confirmed(None),
        }])
    }

    async fn get_fee_rate(&self) -> Result<f64, QueryError> {
        Ok(1.0)
    }

    async fn broadcast(&self, _raw_tx_hex: &str) -> Result<(), QueryError> {
        Ok(())
    }
}

/// Memory store whose scan commits can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_commits: bool,
}

impl DepthStore for FlakyStore {
    fn depth(&self, chain: ChainType) -> Result<u32, StoreError> {
        self.inner.depth(chain)
    }

    fn set_depth(&mut self, chain: ChainType, depth: u32) -> Result<(), StoreError> {
        self.inner.set_depth(chain, depth)
    }

    fn coins(&self) -> Result<Vec<Coin>, StoreError> {
        self.inner.coins()
    }

    fn merge_coins(&mut self, coins: &[Coin]) -> Result<usize, StoreError> {
        self.inner.merge_coins(coins)
    }

    fn commit_scan(&mut self, chain: ChainType, depth: u32, coins: &[Coin]) -> Result<usize, StoreError> {
        if self.fail_commits {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.inner.commit_scan(chain, depth, coins)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.inner.close()
    }
}
