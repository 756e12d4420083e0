use bip39::{Language, Mnemonic};
use zeroize::Zeroizing;

use crate::error::WalletError;

/// Derive the 64-byte BIP-39 seed from mnemonic + optional passphrase.
/// The seed is wiped when the returned buffer is dropped.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Zeroizing<Vec<u8>>, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase.trim())
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    let mut seed = mnemonic.to_seed(passphrase);
    let out = Zeroizing::new(seed.to_vec());
    zeroize::Zeroize::zeroize(&mut seed);
    Ok(out)
}
