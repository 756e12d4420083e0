use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Reference to a transaction output: `(txid, vout)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Transaction ID as a hex string (big-endian / display order).
    pub txid: String,
    /// Output index within the transaction.
    pub vout: u32,
}

impl std::fmt::Display for OutPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// Confirmation state reported by the chain-data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinStatus {
    pub is_confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u32>,
}

impl CoinStatus {
    pub fn confirmed(block_height: Option<u32>) -> Self {
        Self {
            is_confirmed: true,
            block_height,
        }
    }

    pub fn unconfirmed() -> Self {
        Self::default()
    }
}

/// An unspent output observed at a wallet-controlled address.
///
/// Coins are identified by their outpoint and never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub txid: String,
    pub vout: u32,
    /// Value in satoshis.
    pub value: u64,
    pub address: String,
    pub status: CoinStatus,
}

impl Coin {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid.clone(),
            vout: self.vout,
        }
    }

    /// Check a coin returned for a probe of `address`.
    pub fn validate_for(&self, address: &str) -> Result<(), QueryError> {
        if !is_txid_hex(&self.txid) {
            return Err(QueryError::MalformedResponse(format!(
                "txid is not 64 hex characters: {:?}",
                self.txid
            )));
        }
        if self.address != address {
            return Err(QueryError::MalformedResponse(format!(
                "coin {} belongs to {}, expected {}",
                self.outpoint(),
                self.address,
                address
            )));
        }
        Ok(())
    }
}

fn is_txid_hex(txid: &str) -> bool {
    txid.len() == 64 && hex::decode(txid).is_ok()
}
