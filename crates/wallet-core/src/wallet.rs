//! Wallet orchestration: one discovery pass per chain over a scoped store.

use std::collections::BTreeMap;

use chain_btc::{ChainDataSource, Coin, OutPoint};

use crate::config::{validate_gap_limit, WalletConfig};
use crate::discovery::{AddressDiscovery, ScanOutcome};
use crate::error::WalletError;
use crate::hd_derivation::{Bip84Deriver, KeyDerivationProvider};
use crate::mnemonic::mnemonic_to_seed;
use crate::store::DepthStore;
use crate::types::{Balance, ChainDepths, ChainType};

/// Arguments to [`Wallet::init`].
#[derive(Debug, Clone, Copy)]
pub struct InitOptions<'a> {
    pub mnemonic: &'a str,
    /// BIP-39 passphrase, empty by default.
    pub passphrase: &'a str,
    /// Overrides [`WalletConfig::gap_limit`] for this call.
    pub gap_limit: Option<u32>,
}

impl<'a> InitOptions<'a> {
    pub fn new(mnemonic: &'a str) -> Self {
        Self {
            mnemonic,
            passphrase: "",
            gap_limit: None,
        }
    }

    pub fn with_passphrase(mut self, passphrase: &'a str) -> Self {
        self.passphrase = passphrase;
        self
    }

    pub fn with_gap_limit(mut self, gap_limit: u32) -> Self {
        self.gap_limit = Some(gap_limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitSummary {
    pub receive: ScanOutcome,
    pub change: ScanOutcome,
}

/// In-memory mirror of what the store holds.
#[derive(Debug, Default)]
struct Cache {
    depths: ChainDepths,
    coins: BTreeMap<OutPoint, Coin>,
}

impl Cache {
    fn apply(&mut self, outcome: &ScanOutcome) {
        let depth = self.depths.get(outcome.chain).max(outcome.depth);
        self.depths.set(outcome.chain, depth);
        for coin in &outcome.coins {
            self.coins
                .entry(coin.outpoint())
                .or_insert_with(|| coin.clone());
        }
    }
}

/// HD wallet that discovers its receive and change chains.
///
/// The store is acquired at construction and released by [`Wallet::close`],
/// or on drop if `close` is never reached.
pub struct Wallet<S: DepthStore, C, K = Bip84Deriver> {
    store: Option<S>,
    source: C,
    deriver: K,
    config: WalletConfig,
    cache: Cache,
}

impl<S: DepthStore, C: ChainDataSource> Wallet<S, C, Bip84Deriver> {
    /// BIP-84 wallet for the source's network.
    ///
    /// With the default `query_timeout_ms`, [`Wallet::init`] must run on a
    /// tokio runtime with the time driver enabled (`enable_time` or
    /// `enable_all`); otherwise the first probe panics. Set the timeout to
    /// `None` to run without it.
    pub fn new(store: S, source: C, config: WalletConfig) -> Result<Self, WalletError> {
        let mut deriver = Bip84Deriver::new(source.network()).with_account(config.account);
        if let Some(coin_type) = config.coin_type {
            deriver = deriver.with_coin_type(coin_type);
        }
        Self::with_deriver(store, source, deriver, config)
    }
}

impl<S, C, K> Wallet<S, C, K>
where
    S: DepthStore,
    C: ChainDataSource,
    K: KeyDerivationProvider,
{
    pub fn with_deriver(store: S, source: C, deriver: K, config: WalletConfig) -> Result<Self, WalletError> {
        // Built first so an early return still releases the store on drop.
        let mut wallet = Self {
            store: Some(store),
            source,
            deriver,
            config,
            cache: Cache::default(),
        };
        wallet.config.validate()?;
        wallet.reload()?;
        Ok(wallet)
    }

    /// Rebuild the cached depths and coins from the store.
    pub fn reload(&mut self) -> Result<(), WalletError> {
        let store = self.store.as_ref().ok_or(WalletError::Closed)?;
        let depths = ChainDepths {
            receive: store.receive_depth()?,
            change: store.change_depth()?,
        };
        let coins = store
            .coins()?
            .into_iter()
            .map(|coin| (coin.outpoint(), coin))
            .collect();
        self.cache = Cache { depths, coins };
        Ok(())
    }

    /// Discover both chains from their persisted depths.
    ///
    /// Receive is committed before change is scanned (unless
    /// `concurrent_chains` is set, in which case both scans run together and
    /// each successful one is committed, receive first). Depths and coins are
    /// only updated in memory after the store accepted them.
    pub async fn init(&mut self, options: InitOptions<'_>) -> Result<InitSummary, WalletError> {
        let gap_limit = options.gap_limit.unwrap_or(self.config.gap_limit);
        validate_gap_limit(gap_limit)?;
        let seed = mnemonic_to_seed(options.mnemonic, options.passphrase)?;

        let store = self.store.as_mut().ok_or(WalletError::Closed)?;
        let cache = &mut self.cache;
        let engine = AddressDiscovery::new(&self.deriver, &self.source, &seed, gap_limit)?
            .with_probe_window(self.config.probe_window)
            .with_query_timeout(self.config.query_timeout());

        let start = ChainDepths {
            receive: store.receive_depth()?,
            change: store.change_depth()?,
        };
        log::info!(
            "Initializing wallet: receive depth {}, change depth {}, gap limit {}",
            start.receive,
            start.change,
            gap_limit
        );

        let (receive, change) = if self.config.concurrent_chains {
            let (receive, change) = futures::join!(
                engine.scan(ChainType::Receive, start.receive),
                engine.scan(ChainType::Change, start.change)
            );
            let receive = receive.and_then(|outcome| commit(store, cache, outcome));
            let change = change.and_then(|outcome| commit(store, cache, outcome));
            (receive?, change?)
        } else {
            let receive = engine
                .discover(ChainType::Receive, start.receive, store)
                .await?;
            cache.apply(&receive);
            let change = engine
                .discover(ChainType::Change, start.change, store)
                .await?;
            cache.apply(&change);
            (receive, change)
        };

        store.flush()?;
        log::info!(
            "Wallet initialized: receive depth {}, change depth {}, {} coins",
            cache.depths.receive,
            cache.depths.change,
            cache.coins.len()
        );

        Ok(InitSummary { receive, change })
    }

    pub fn depth(&self, chain: ChainType) -> u32 {
        self.cache.depths.get(chain)
    }

    pub fn depths(&self) -> ChainDepths {
        self.cache.depths
    }

    pub fn receive_depth(&self) -> u32 {
        self.cache.depths.receive
    }

    pub fn change_depth(&self) -> u32 {
        self.cache.depths.change
    }

    /// Discovered coins ordered by outpoint.
    pub fn coins(&self) -> impl Iterator<Item = &Coin> {
        self.cache.coins.values()
    }

    pub fn coin(&self, outpoint: &OutPoint) -> Option<&Coin> {
        self.cache.coins.get(outpoint)
    }

    pub fn balance(&self) -> Balance {
        self.coins().fold(Balance::default(), |mut balance, coin| {
            if coin.status.is_confirmed {
                balance.confirmed_sat += coin.value;
            } else {
                balance.unconfirmed_sat += coin.value;
            }
            balance
        })
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn deriver(&self) -> &K {
        &self.deriver
    }

    pub fn is_closed(&self) -> bool {
        self.store.is_none()
    }

    /// Flush and release the store.
    pub fn close(mut self) -> Result<(), WalletError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), WalletError> {
        let Some(mut store) = self.store.take() else {
            return Ok(());
        };
        let flushed = store.flush();
        let closed = store.close();
        flushed?;
        closed?;
        log::debug!("Wallet closed");
        Ok(())
    }
}

impl<S: DepthStore, C, K> Drop for Wallet<S, C, K> {
    fn drop(&mut self) {
        if let Some(mut store) = self.store.take() {
            if let Err(e) = store.close() {
                log::warn!("Failed to release wallet store: {}", e);
            }
        }
    }
}

fn commit<S: DepthStore>(store: &mut S, cache: &mut Cache, outcome: ScanOutcome) -> Result<ScanOutcome, WalletError> {
    store.commit_scan(outcome.chain, outcome.depth, &outcome.coins)?;
    cache.apply(&outcome);
    Ok(outcome)
}
