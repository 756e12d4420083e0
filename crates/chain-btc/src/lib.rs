//! Bitcoin chain support for the discovery wallet.
//!
//! Provides P2WPKH address encoding, the coin (UTXO) model, and the
//! `ChainDataSource` capability that discovery queries for address usage.

pub mod address;
pub mod error;
pub mod network;
pub mod source;
pub mod utxo;

pub use error::{BtcError, QueryError};
pub use network::BtcNetwork;
pub use source::ChainDataSource;
pub use utxo::{Coin, CoinStatus, OutPoint};
