use bip32::{DerivationPath, XPrv};
use chain_btc::BtcNetwork;
use k256::ecdsa::SigningKey;
use zeroize::Zeroize;

use crate::error::WalletError;
use crate::types::ChainType;

/// First hardened child index; receive/change indices must stay below it.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Maps `(seed, chain, index)` to a wallet address.
///
/// Implementations must be deterministic and free of I/O.
pub trait KeyDerivationProvider: Send + Sync {
    fn derive_address(&self, seed: &[u8], chain: ChainType, index: u32) -> Result<String, WalletError>;
}

/// BIP-84 derivation path: m/84'/coin_type'/account'/branch/index
pub fn bip84_path(coin_type: u32, account: u32, chain: ChainType, index: u32) -> Result<String, WalletError> {
    if coin_type >= HARDENED_OFFSET || account >= HARDENED_OFFSET {
        return Err(WalletError::Derivation(format!(
            "coin type {coin_type} / account {account} out of hardened range"
        )));
    }
    if index >= HARDENED_OFFSET {
        return Err(WalletError::Derivation(format!(
            "address index {index} exceeds the non-hardened range"
        )));
    }
    Ok(format!("m/84'/{}'/{}'/{}/{}", coin_type, account, chain.branch(), index))
}

/// Native SegWit (P2WPKH) addresses under a single BIP-84 account.
#[derive(Debug, Clone, Copy)]
pub struct Bip84Deriver {
    network: BtcNetwork,
    coin_type: u32,
    account: u32,
}

impl Bip84Deriver {
    /// Account 0 with the network's registered coin type.
    pub fn new(network: BtcNetwork) -> Self {
        Self {
            network,
            coin_type: network.coin_type(),
            account: 0,
        }
    }

    pub fn with_coin_type(mut self, coin_type: u32) -> Self {
        self.coin_type = coin_type;
        self
    }

    pub fn with_account(mut self, account: u32) -> Self {
        self.account = account;
        self
    }

    pub fn network(&self) -> BtcNetwork {
        self.network
    }

    pub fn path(&self, chain: ChainType, index: u32) -> Result<String, WalletError> {
        bip84_path(self.coin_type, self.account, chain, index)
    }

    /// Compressed public key at `chain/index`.
    pub fn derive_public_key(&self, seed: &[u8], chain: ChainType, index: u32) -> Result<[u8; 33], WalletError> {
        let path_str = self.path(chain, index)?;

        let path: DerivationPath = path_str
            .parse()
            .map_err(|e: bip32::Error| WalletError::Derivation(e.to_string()))?;

        let xprv = XPrv::derive_from_path(seed, &path)
            .map_err(|e| WalletError::Derivation(e.to_string()))?;

        let mut private_key_bytes: [u8; 32] = xprv.to_bytes().into();
        let signing_key = SigningKey::from_bytes(&private_key_bytes.into());
        private_key_bytes.zeroize();
        let signing_key = signing_key.map_err(|e| WalletError::Derivation(e.to_string()))?;

        signing_key
            .verifying_key()
            .to_sec1_bytes()
            .as_ref()
            .try_into()
            .map_err(|_| WalletError::Derivation("Invalid public key length".into()))
    }
}

impl KeyDerivationProvider for Bip84Deriver {
    fn derive_address(&self, seed: &[u8], chain: ChainType, index: u32) -> Result<String, WalletError> {
        let pubkey = self.derive_public_key(seed, chain, index)?;
        let address = chain_btc::address::pubkey_to_p2wpkh_address(&pubkey, self.network)?;
        Ok(address)
    }
}
