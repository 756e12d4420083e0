//! Gap-limit address discovery for a single chain.
//!
//! A scan walks one chain upward from a starting depth, probing each derived
//! address for UTXOs, and stops once `gap_limit` consecutive addresses come
//! back empty. Each probe's outcome decides whether the walk continues, so the
//! walk is an explicit [`ScanState`] machine advanced one index at a time.
//! With a probe window above 1, a batch of addresses is queried concurrently
//! but outcomes are still applied strictly in index order.

use std::collections::BTreeMap;
use std::time::Duration;

use chain_btc::{ChainDataSource, Coin, OutPoint, QueryError};

use crate::config::validate_gap_limit;
use crate::error::WalletError;
use crate::hd_derivation::KeyDerivationProvider;
use crate::store::DepthStore;
use crate::types::ChainType;

/// Progress of one scan pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning {
        /// Next index to probe.
        index: u32,
        consecutive_unused: u32,
        /// Highest used index seen so far plus one; the start depth until a
        /// used address turns up.
        depth: u32,
    },
    Done {
        depth: u32,
    },
}

impl ScanState {
    pub fn start(start_depth: u32) -> Self {
        ScanState::Scanning {
            index: start_depth,
            consecutive_unused: 0,
            depth: start_depth,
        }
    }

    /// Apply the outcome of probing the current index.
    pub fn advance(self, used: bool, gap_limit: u32) -> Self {
        let ScanState::Scanning {
            index,
            consecutive_unused,
            depth,
        } = self
        else {
            return self;
        };

        let (consecutive_unused, depth) = if used {
            (0, index + 1)
        } else {
            (consecutive_unused + 1, depth)
        };

        if consecutive_unused >= gap_limit {
            ScanState::Done { depth }
        } else {
            ScanState::Scanning {
                index: index + 1,
                consecutive_unused,
                depth,
            }
        }
    }
}

/// Result of scanning one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub chain: ChainType,
    pub start_depth: u32,
    /// New depth: highest used index plus one, never below `start_depth`.
    pub depth: u32,
    /// Number of addresses whose probe outcome was applied.
    pub probed: u32,
    /// Indices at which UTXOs were found, ascending.
    pub used_indices: Vec<u32>,
    /// Coins found during the pass, ordered by outpoint.
    pub coins: Vec<Coin>,
}

/// Discovery engine bound to one seed, deriver and chain-data source.
pub struct AddressDiscovery<'a, K: ?Sized, C: ?Sized> {
    deriver: &'a K,
    source: &'a C,
    seed: &'a [u8],
    gap_limit: u32,
    probe_window: u32,
    query_timeout: Option<Duration>,
}

impl<'a, K, C> AddressDiscovery<'a, K, C>
where
    K: KeyDerivationProvider + ?Sized,
    C: ChainDataSource + ?Sized,
{
    pub fn new(deriver: &'a K, source: &'a C, seed: &'a [u8], gap_limit: u32) -> Result<Self, WalletError> {
        validate_gap_limit(gap_limit)?;
        Ok(Self {
            deriver,
            source,
            seed,
            gap_limit,
            probe_window: 1,
            query_timeout: None,
        })
    }

    pub fn with_probe_window(mut self, probe_window: u32) -> Self {
        self.probe_window = probe_window.max(1);
        self
    }

    /// Bound each probe; requires a tokio runtime with the time driver.
    pub fn with_query_timeout(mut self, query_timeout: Option<Duration>) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn gap_limit(&self) -> u32 {
        self.gap_limit
    }

    /// Scan `chain` from `start_depth` without touching any store.
    ///
    /// A failed probe aborts the scan; nothing about the failing index or
    /// anything after it is reported.
    pub async fn scan(&self, chain: ChainType, start_depth: u32) -> Result<ScanOutcome, WalletError> {
        log::debug!(
            "Scanning {} chain from depth {} (gap limit {})",
            chain,
            start_depth,
            self.gap_limit
        );

        let mut state = ScanState::start(start_depth);
        let mut coins: BTreeMap<OutPoint, Coin> = BTreeMap::new();
        let mut used_indices = Vec::new();
        let mut probed = 0u32;

        let depth = loop {
            let (index, consecutive_unused) = match state {
                ScanState::Done { depth } => break depth,
                ScanState::Scanning {
                    index,
                    consecutive_unused,
                    ..
                } => (index, consecutive_unused),
            };

            // Never probe past the point where the gap could close.
            let batch = self.probe_window.min(self.gap_limit - consecutive_unused);
            let indices: Vec<u32> = (index..index.saturating_add(batch)).collect();
            let results =
                futures::future::try_join_all(indices.iter().map(|&i| self.probe(chain, i))).await?;

            for (i, found) in indices.into_iter().zip(results) {
                probed += 1;
                let used = !found.is_empty();
                if used {
                    log::debug!("{} chain index {} used ({} UTXOs)", chain, i, found.len());
                    used_indices.push(i);
                    for coin in found {
                        coins.entry(coin.outpoint()).or_insert(coin);
                    }
                }
                state = state.advance(used, self.gap_limit);
                if matches!(state, ScanState::Done { .. }) {
                    break;
                }
            }
        };

        log::info!(
            "{} chain scan finished: depth {} -> {} after {} probes, {} coins",
            chain,
            start_depth,
            depth,
            probed,
            coins.len()
        );

        Ok(ScanOutcome {
            chain,
            start_depth,
            depth,
            probed,
            used_indices,
            coins: coins.into_values().collect(),
        })
    }

    /// Scan `chain` and record the new depth and coins in `store` as one
    /// update. A failed scan leaves the store untouched.
    pub async fn discover<S>(
        &self,
        chain: ChainType,
        start_depth: u32,
        store: &mut S,
    ) -> Result<ScanOutcome, WalletError>
    where
        S: DepthStore + ?Sized,
    {
        let outcome = self.scan(chain, start_depth).await?;
        let added = store.commit_scan(chain, outcome.depth, &outcome.coins)?;
        log::debug!(
            "Persisted {} depth {} ({} new coins)",
            chain,
            outcome.depth,
            added
        );
        Ok(outcome)
    }

    async fn probe(&self, chain: ChainType, index: u32) -> Result<Vec<Coin>, WalletError> {
        let address = self.deriver.derive_address(self.seed, chain, index)?;

        let query = self.source.get_utxos(&address);
        let result = match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, query)
                .await
                .unwrap_or_else(|_| Err(QueryError::Timeout(limit.as_millis() as u64))),
            None => query.await,
        };

        result
            .and_then(|coins| {
                for coin in &coins {
                    coin.validate_for(&address)?;
                }
                Ok(coins)
            })
            .map_err(|source| {
                log::warn!(
                    "UTXO query for {} chain index {} ({}) failed: {}",
                    chain,
                    index,
                    address,
                    source
                );
                WalletError::Query {
                    chain,
                    index,
                    source,
                }
            })
    }
}
