use super::utils;
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use eyre::Result;
use serde::Serialize;

/// Options selecting the signer of ATM transactions.
///
/// The signer can either be:
/// 1. Private Key (cleartext in CLI)
/// 2. Mnemonic (phrase or file path)
/// 3. Keystore (via file path)
///
/// Without any of them, transactions are signed by the node's unlocked accounts.
#[derive(Clone, Debug, Default, Serialize, Parser)]
#[command(next_help_heading = "Wallet options")]
pub struct WalletOpts {
    /// Use the provided private key.
    #[arg(long, value_name = "RAW_PRIVATE_KEY", env = "ATM_PRIVATE_KEY", global = true)]
    pub private_key: Option<String>,

    /// Use the mnemonic phrase of mnemonic file at the specified path.
    #[arg(long, alias = "mnemonic-path", conflicts_with = "private_key", global = true)]
    pub mnemonic: Option<String>,

    /// Use the private key from the given mnemonic index.
    ///
    /// Used with --mnemonic.
    #[arg(long, default_value_t = 0, value_name = "INDEX", global = true)]
    pub mnemonic_index: u32,

    /// Use the keystore at the specified path.
    #[arg(
        long = "keystore",
        value_name = "PATH",
        env = "ETH_KEYSTORE",
        conflicts_with_all = ["private_key", "mnemonic"],
        global = true
    )]
    pub keystore_path: Option<String>,

    /// The keystore password.
    ///
    /// Used with --keystore. Prompted for when missing.
    #[arg(long = "password", requires = "keystore_path", value_name = "PASSWORD", global = true)]
    #[serde(skip)]
    pub keystore_password: Option<String>,
}

impl WalletOpts {
    /// Returns the configured local signer, or `None` if the node's unlocked accounts should sign.
    pub fn signer(&self) -> Result<Option<PrivateKeySigner>> {
        trace!("start finding signer");

        if let Some(private_key) = &self.private_key {
            trace!("using private key");
            return utils::create_private_key_signer(private_key).map(Some);
        }
        if let Some(mnemonic) = &self.mnemonic {
            trace!("using mnemonic");
            return utils::create_mnemonic_signer(mnemonic, self.mnemonic_index).map(Some);
        }
        if let Some(path) = &self.keystore_path {
            trace!("using keystore");
            return utils::create_keystore_signer(path, self.keystore_password.as_deref())
                .map(Some);
        }

        trace!("using unlocked accounts");
        Ok(None)
    }
}
