//! Configuration of the ATM client.
//!
//! Values are layered with [`figment`]: the defaults below, then `atm.toml` (or the file named by
//! `ATM_CONFIG`), then `ATM_*` environment variables, and finally any provider passed to
//! [`AtmConfig::load_with`], usually the command line options.

use crate::error::ExtractConfigError;
use alloy_primitives::{Address, U256, address};
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by every session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmConfig {
    /// The address of the deployed ATM contract.
    pub contract: Address,
    /// The RPC endpoint of the wallet provider.
    pub eth_rpc_url: Option<String>,
    /// The fixed amount moved by a deposit or a withdrawal.
    pub amount: u64,
    /// Number of confirmations to wait for after submitting a transaction.
    pub confirmations: u64,
    /// Seconds to wait for a confirmation. Unbounded when unset.
    pub transaction_timeout: Option<u64>,
    /// Receipt polling interval in milliseconds.
    pub poll_interval: Option<u64>,
    /// Seconds between reconciliations in the interactive shell, `0` disables them.
    pub refresh_interval: u64,
}

impl AtmConfig {
    /// The default name of the configuration file.
    pub const FILE_NAME: &'static str = "atm.toml";

    /// The default contract address, as deployed first on a fresh local dev node.
    ///
    /// `0x5FbDB2315678afecb367f032d93F642f64180aa3`
    pub const DEFAULT_CONTRACT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    /// The default RPC endpoint.
    pub const DEFAULT_RPC_URL: &'static str = "http://localhost:8545";

    /// Loads the configuration from the default providers.
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment())
    }

    /// Loads the configuration from the default providers, merged with `provider`.
    pub fn load_with<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment().merge(provider))
    }

    /// Attempts to extract an `AtmConfig` from `provider`.
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        trace!("load config with provider: {:?}", provider.metadata());
        Ok(Figment::from(provider).extract::<Self>()?)
    }

    /// Returns the default [`Figment`]: defaults, configuration file and environment.
    pub fn figment() -> Figment {
        let file = std::env::var("ATM_CONFIG").unwrap_or_else(|_| Self::FILE_NAME.to_string());
        Figment::from(Self::default())
            .merge(Toml::file(file))
            .merge(Env::prefixed("ATM_").ignore(&["CONFIG", "DEBUG"]))
    }

    /// The RPC endpoint, falling back to [`Self::DEFAULT_RPC_URL`].
    pub fn rpc_url(&self) -> &str {
        self.eth_rpc_url.as_deref().unwrap_or(Self::DEFAULT_RPC_URL)
    }

    /// The amount moved by a deposit or a withdrawal.
    pub fn amount(&self) -> U256 {
        U256::from(self.amount)
    }

    pub fn transaction_timeout(&self) -> Option<Duration> {
        self.transaction_timeout.map(Duration::from_secs)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval.map(Duration::from_millis)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval > 0).then(|| Duration::from_secs(self.refresh_interval))
    }
}

impl Default for AtmConfig {
    fn default() -> Self {
        Self {
            contract: Self::DEFAULT_CONTRACT,
            eth_rpc_url: None,
            amount: 1,
            confirmations: 1,
            transaction_timeout: None,
            poll_interval: None,
            refresh_interval: 0,
        }
    }
}

impl Provider for AtmConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("ATM Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}
