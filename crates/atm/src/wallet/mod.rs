//! Wallet providers.
//!
//! A [`WalletProvider`] discovers the accounts a user is willing to act with and binds the ATM
//! contract to one of them. [`RpcWallet`] implements it on top of an RPC endpoint, signing either
//! with local keys or through the node's unlocked accounts.

use crate::{
    config::AtmConfig,
    contract::{AtmContract, ChainAtm},
    error::{WalletError, user_rejection},
};
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

mod opts;
pub use opts::WalletOpts;

pub mod utils;

/// Account access and contract binding.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the wallet for account access, which may prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Returns the accounts the wallet already authorized, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Binds the contract deployed at `contract` to `account` as signer.
    fn bind(&self, contract: Address, account: Address) -> Box<dyn AtmContract>;
}

/// [`WalletProvider`] backed by an RPC endpoint.
#[derive(Clone, Debug)]
pub struct RpcWallet {
    provider: DynProvider,
    /// Addresses of the local signers, empty when the node signs.
    signers: Vec<Address>,
    confirmations: u64,
    timeout: Option<Duration>,
}

impl RpcWallet {
    /// Connects to `url`, signing with `signer` if given or with the node's unlocked accounts
    /// otherwise.
    pub fn new(url: Url, signer: Option<PrivateKeySigner>) -> Self {
        let signers = signer.iter().map(|signer| signer.address()).collect();
        let provider = match signer {
            Some(signer) => {
                ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect_http(url).erased()
            }
            None => ProviderBuilder::new().connect_http(url).erased(),
        };
        Self { signers, ..Self::with_provider(provider) }
    }

    /// Wraps an already connected provider whose node signs transactions.
    pub fn with_provider(provider: DynProvider) -> Self {
        Self { provider, signers: Vec::new(), confirmations: 1, timeout: None }
    }

    /// Looks for a wallet provider at the configured endpoint.
    ///
    /// Returns `None` if the endpoint is not a valid URL or does not answer `eth_chainId`.
    pub async fn detect(config: &AtmConfig, signer: Option<PrivateKeySigner>) -> Option<Self> {
        let url = match Url::parse(config.rpc_url()) {
            Ok(url) => url,
            Err(err) => {
                warn!(url = config.rpc_url(), %err, "invalid RPC url");
                return None;
            }
        };

        let wallet = Self::new(url, signer)
            .with_confirmations(config.confirmations)
            .with_timeout(config.transaction_timeout());
        if let Some(interval) = config.poll_interval() {
            wallet.provider.client().set_poll_interval(interval);
        }

        match wallet.provider.get_chain_id().await {
            Ok(chain_id) => {
                debug!(url = config.rpc_url(), chain_id, "found wallet provider");
                Some(wallet)
            }
            Err(err) => {
                debug!(url = config.rpc_url(), %err, "no wallet provider");
                None
            }
        }
    }

    /// Sets the number of confirmations contract handles wait for.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Sets how long contract handles wait for a confirmation.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the underlying provider.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if !self.signers.is_empty() {
            return Ok(self.signers.clone());
        }
        self.provider
            .raw_request::<_, Vec<Address>>("eth_requestAccounts".into(), ())
            .await
            .map_err(request_error)
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        if !self.signers.is_empty() {
            return Ok(self.signers.clone());
        }
        self.provider.get_accounts().await.map_err(request_error)
    }

    fn bind(&self, contract: Address, account: Address) -> Box<dyn AtmContract> {
        Box::new(
            ChainAtm::new(contract, self.provider.clone(), account)
                .with_confirmations(self.confirmations)
                .with_timeout(self.timeout),
        )
    }
}

fn request_error(err: TransportError) -> WalletError {
    match user_rejection(&err) {
        Some(message) => WalletError::Rejected(message),
        None => err.into(),
    }
}
