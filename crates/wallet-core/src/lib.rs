//! HD wallet core: BIP-84 address derivation and gap-limit discovery.
//!
//! A [`Wallet`] derives its receive and change chains from a mnemonic, asks a
//! [`ChainDataSource`] which addresses hold coins, and advances each chain's
//! depth (next unused index) until `gap_limit` consecutive addresses are
//! empty. Depths and coins are persisted through a [`DepthStore`], so a later
//! `init` resumes from where the previous one stopped.
//!
//! ```ignore
//! use wallet_core::{FileStore, InitOptions, Wallet, WalletConfig};
//!
//! let store = FileStore::open("./wallet-data")?;
//! let mut wallet = Wallet::new(store, esplora, WalletConfig::default())?;
//! wallet.init(InitOptions::new(mnemonic)).await?;
//! println!("next receive index: {}", wallet.receive_depth());
//! wallet.close()?;
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod hd_derivation;
pub mod mnemonic;
pub mod store;
pub mod types;
pub mod wallet;

pub use chain_btc::{BtcNetwork, ChainDataSource, Coin, CoinStatus, OutPoint, QueryError};
pub use config::{WalletConfig, DEFAULT_GAP_LIMIT};
pub use discovery::{AddressDiscovery, ScanOutcome, ScanState};
pub use error::WalletError;
pub use hd_derivation::{Bip84Deriver, KeyDerivationProvider};
pub use store::{DepthStore, FileStore, MemoryStore, StoreError};
pub use types::{Balance, ChainDepths, ChainType};
pub use wallet::{InitOptions, InitSummary, Wallet};
