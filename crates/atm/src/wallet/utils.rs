//! Signer construction from user input.

use crate::error::WalletError;
use alloy_primitives::{B256, hex::FromHex};
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use eyre::{Context, Result};
use std::{fs, path::Path};

fn ensure_pk_not_env(pk: &str) -> Result<()> {
    if !pk.starts_with("0x") && std::env::var(pk).is_ok() {
        eyre::bail!(
            "Failed to create wallet from private key. Invalid private key. But env var {pk} exists. Is the `$` anchor missing?"
        );
    }
    Ok(())
}

/// Validates and sanitizes a private key, returning the matching signer.
pub fn create_private_key_signer(private_key_str: &str) -> Result<PrivateKeySigner> {
    let Ok(private_key) = B256::from_hex(private_key_str.trim()) else {
        ensure_pk_not_env(private_key_str)?;
        eyre::bail!("Failed to decode private key")
    };
    match PrivateKeySigner::from_bytes(&private_key) {
        Ok(pk) => Ok(pk),
        Err(err) => {
            ensure_pk_not_env(private_key_str)?;
            eyre::bail!("Failed to create wallet from private key: {err}")
        }
    }
}

/// Creates a signer from a mnemonic phrase, or the path of a file containing one.
pub fn create_mnemonic_signer(mnemonic: &str, index: u32) -> Result<PrivateKeySigner> {
    let mnemonic = if Path::new(mnemonic).is_file() {
        fs::read_to_string(mnemonic).map_err(WalletError::from)?
    } else {
        mnemonic.to_owned()
    };
    let mnemonic = mnemonic.split_whitespace().collect::<Vec<_>>().join(" ");

    MnemonicBuilder::<English>::default()
        .phrase(mnemonic)
        .index(index)
        .map_err(WalletError::from)?
        .build()
        .map_err(WalletError::from)
        .wrap_err("Failed to create wallet from mnemonic")
}

/// Decrypts the keystore at `path`, prompting for the password if none was given.
pub fn create_keystore_signer(path: &str, password: Option<&str>) -> Result<PrivateKeySigner> {
    let path = Path::new(path);
    if !path.exists() {
        eyre::bail!("Keystore file `{path:?}` does not exist")
    }
    if path.is_dir() {
        eyre::bail!(
            "Keystore path `{path:?}` is a directory. Please specify the keystore file directly."
        )
    }

    let password = match password {
        Some(password) => password.to_string(),
        None => rpassword::prompt_password("Enter keystore password:")?,
    };

    PrivateKeySigner::decrypt_keystore(path, password)
        .map_err(WalletError::from)
        .wrap_err_with(|| format!("Failed to decrypt keystore {path:?}"))
}
