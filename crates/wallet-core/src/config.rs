//! Wallet configuration.
//!
//! All fields have defaults, so an empty JSON object is a valid config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Consecutive unused addresses probed before a chain is declared exhausted.
pub const DEFAULT_GAP_LIMIT: u32 = 20;

pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub gap_limit: u32,
    /// BIP-84 account index.
    pub account: u32,
    /// BIP-44 coin type; `None` uses the network's registered value.
    pub coin_type: Option<u32>,
    /// Addresses probed concurrently per scan step.
    pub probe_window: u32,
    /// Per-probe timeout; `None` waits for the source indefinitely.
    ///
    /// Enforced with `tokio::time::timeout`, so any value other than `None`
    /// (including the default) needs a tokio runtime with the time driver.
    /// Without it the first probe panics.
    pub query_timeout_ms: Option<u64>,
    /// Scan receive and change chains concurrently.
    pub concurrent_chains: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            gap_limit: DEFAULT_GAP_LIMIT,
            account: 0,
            coin_type: None,
            probe_window: 1,
            query_timeout_ms: Some(DEFAULT_QUERY_TIMEOUT_MS),
            concurrent_chains: false,
        }
    }
}

impl WalletConfig {
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| WalletError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_gap_limit(mut self, gap_limit: u32) -> Self {
        self.gap_limit = gap_limit;
        self
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        validate_gap_limit(self.gap_limit)?;
        if self.probe_window == 0 {
            return Err(WalletError::Config("probe window must be at least 1".into()));
        }
        if self.query_timeout_ms == Some(0) {
            return Err(WalletError::Config("query timeout must be positive".into()));
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }
}

pub fn validate_gap_limit(gap_limit: u32) -> Result<(), WalletError> {
    if gap_limit == 0 {
        return Err(WalletError::Config("gap limit must be at least 1".into()));
    }
    Ok(())
}
