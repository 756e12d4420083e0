//! Chain-data capability consumed by the wallet.
//!
//! Any backend (Esplora, Electrum, a node's RPC, a test double) plugs in by
//! implementing [`ChainDataSource`]. Discovery only calls
//! [`get_utxos`](ChainDataSource::get_utxos); the remaining methods serve the
//! wider wallet.

use async_trait::async_trait;

use crate::error::QueryError;
use crate::network::BtcNetwork;
use crate::utxo::Coin;

#[async_trait]
pub trait ChainDataSource: Send + Sync {
    /// Network the backend serves; derived addresses are encoded for it.
    fn network(&self) -> BtcNetwork;

    /// Unspent outputs currently known at `address`.
    ///
    /// An empty list is the "unused address" signal. Backend failures must be
    /// reported as `Err`, never as an empty list.
    async fn get_utxos(&self, address: &str) -> Result<Vec<Coin>, QueryError>;

    async fn get_latest_block_height(&self) -> Result<u32, QueryError>;

    /// Hash of the tip block, 64 hex characters.
    async fn get_latest_block_hash(&self) -> Result<String, QueryError>;

    async fn get_block_hash(&self, height: u32) -> Result<String, QueryError>;

    /// Fee rate in sat/vB.
    async fn get_fee_rate(&self) -> Result<f64, QueryError>;

    /// Broadcast a raw transaction given as hex.
    async fn broadcast(&self, raw_tx_hex: &str) -> Result<(), QueryError>;
}
