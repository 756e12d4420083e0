use chain_btc::QueryError;
use thiserror::Error;

use crate::store::StoreError;
use crate::types::ChainType;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Key derivation failed: {0}")]
    Derivation(String),

    #[error("Query failed on {chain} chain at index {index}: {source}")]
    Query {
        chain: ChainType,
        index: u32,
        #[source]
        source: QueryError,
    },

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("Wallet is closed")]
    Closed,
}

impl WalletError {
    /// Whether retrying the failed scan from the persisted depth can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::Query { .. })
    }
}

impl From<chain_btc::BtcError> for WalletError {
    fn from(e: chain_btc::BtcError) -> Self {
        WalletError::Derivation(format!("BTC: {e}"))
    }
}
