//! The ATM contract proxy.
//!
//! [`AtmContract`] is the seam between the session manager and the deployed contract. Every
//! mutating call hands back a [`PendingAction`] that resolves once the transaction is confirmed.

use crate::error::{ContractError, user_rejection};
use alloy_network::ReceiptResponse;
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder};
use alloy_sol_types::sol;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::{fmt, time::Duration};

sol! {
    #[sol(rpc)]
    interface IAssessment {
        #[derive(Debug)]
        error InsufficientBalance(uint256 balance, uint256 withdrawAmount);

        function getBalance() external view returns (uint256);
        function paused() external view returns (bool);
        function deposit(uint256 amount) external;
        function withdraw(uint256 withdrawAmount) external;
        function pauseContract() external;
        function resumeContract() external;
        function disconnectWallet() external;
    }
}

/// A state-changing call on the ATM contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtmAction {
    Deposit(U256),
    Withdraw(U256),
    Pause,
    Resume,
    Disconnect,
}

impl AtmAction {
    /// Returns the name of the contract function this action calls.
    pub const fn function_name(&self) -> &'static str {
        match self {
            Self::Deposit(_) => "deposit",
            Self::Withdraw(_) => "withdraw",
            Self::Pause => "pauseContract",
            Self::Resume => "resumeContract",
            Self::Disconnect => "disconnectWallet",
        }
    }
}

impl fmt::Display for AtmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit(amount) | Self::Withdraw(amount) => {
                write!(f, "{}({amount})", self.function_name())
            }
            _ => write!(f, "{}()", self.function_name()),
        }
    }
}

/// A submitted transaction awaiting confirmation.
///
/// There is no way to cancel the transaction once it was handed to the wallet, dropping the
/// handle only stops waiting for it.
#[must_use = "a pending action does nothing unless its confirmation is awaited"]
pub struct PendingAction {
    tx_hash: TxHash,
    confirmation: BoxFuture<'static, Result<TxHash, ContractError>>,
}

impl PendingAction {
    /// Creates a new pending action from the hash of the submitted transaction and a future
    /// resolving once it is confirmed.
    pub fn new<F>(tx_hash: TxHash, confirmation: F) -> Self
    where
        F: Future<Output = Result<TxHash, ContractError>> + Send + 'static,
    {
        Self { tx_hash, confirmation: Box::pin(confirmation) }
    }

    /// Returns a pending action that is already confirmed.
    pub fn confirmed_with(tx_hash: TxHash) -> Self {
        Self::new(tx_hash, futures::future::ready(Ok(tx_hash)))
    }

    /// The hash of the submitted transaction.
    pub const fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Waits for the transaction to be confirmed.
    pub async fn confirmed(self) -> Result<TxHash, ContractError> {
        self.confirmation.await
    }
}

impl fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAction").field("tx_hash", &self.tx_hash).finish_non_exhaustive()
    }
}

/// Typed client of the deployed ATM contract, bound to a signer account.
#[async_trait]
pub trait AtmContract: Send + Sync + fmt::Debug {
    /// The deployment address.
    fn address(&self) -> Address;

    /// The account transactions are sent from.
    fn account(&self) -> Address;

    /// Queries the balance held by the contract.
    async fn get_balance(&self) -> Result<U256, ContractError>;

    /// Queries the pause flag of the contract.
    async fn paused(&self) -> Result<bool, ContractError>;

    /// Submits the given action as a transaction.
    async fn submit(&self, action: AtmAction) -> Result<PendingAction, ContractError>;

    async fn deposit(&self, amount: U256) -> Result<PendingAction, ContractError> {
        self.submit(AtmAction::Deposit(amount)).await
    }

    async fn withdraw(&self, amount: U256) -> Result<PendingAction, ContractError> {
        self.submit(AtmAction::Withdraw(amount)).await
    }

    async fn pause_contract(&self) -> Result<PendingAction, ContractError> {
        self.submit(AtmAction::Pause).await
    }

    async fn resume_contract(&self) -> Result<PendingAction, ContractError> {
        self.submit(AtmAction::Resume).await
    }

    async fn disconnect_wallet(&self) -> Result<PendingAction, ContractError> {
        self.submit(AtmAction::Disconnect).await
    }
}

/// [`AtmContract`] backed by an RPC provider.
#[derive(Clone, Debug)]
pub struct ChainAtm {
    instance: IAssessment::IAssessmentInstance<DynProvider>,
    account: Address,
    confirmations: u64,
    timeout: Option<Duration>,
}

impl ChainAtm {
    /// Binds the contract deployed at `address` to `account`.
    pub fn new(address: Address, provider: DynProvider, account: Address) -> Self {
        Self {
            instance: IAssessment::new(address, provider),
            account,
            confirmations: 1,
            timeout: None,
        }
    }

    /// Sets the number of confirmations to wait for.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Sets how long to wait for a confirmation. Without a timeout the wait is unbounded.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn pending(&self, pending: PendingTransactionBuilder<alloy_network::Ethereum>) -> PendingAction {
        let tx_hash = *pending.tx_hash();
        let pending =
            pending.with_required_confirmations(self.confirmations).with_timeout(self.timeout);
        PendingAction::new(tx_hash, async move {
            let receipt = pending.get_receipt().await?;
            ensure_success(&receipt)
        })
    }
}

#[async_trait]
impl AtmContract for ChainAtm {
    fn address(&self) -> Address {
        *self.instance.address()
    }

    fn account(&self) -> Address {
        self.account
    }

    async fn get_balance(&self) -> Result<U256, ContractError> {
        self.instance.getBalance().from(self.account).call().await.map_err(decode_call_error)
    }

    async fn paused(&self) -> Result<bool, ContractError> {
        self.instance.paused().call().await.map_err(decode_call_error)
    }

    async fn submit(&self, action: AtmAction) -> Result<PendingAction, ContractError> {
        trace!(%action, contract = %self.address(), from = %self.account, "submitting");
        let pending = match action {
            AtmAction::Deposit(amount) => {
                self.instance.deposit(amount).from(self.account).send().await
            }
            AtmAction::Withdraw(amount) => {
                self.instance.withdraw(amount).from(self.account).send().await
            }
            AtmAction::Pause => self.instance.pauseContract().from(self.account).send().await,
            AtmAction::Resume => self.instance.resumeContract().from(self.account).send().await,
            AtmAction::Disconnect => {
                self.instance.disconnectWallet().from(self.account).send().await
            }
        }
        .map_err(decode_call_error)?;
        Ok(self.pending(pending))
    }
}

/// Fails on a receipt whose transaction reverted.
fn ensure_success<R: ReceiptResponse>(receipt: &R) -> Result<TxHash, ContractError> {
    if receipt.status() {
        Ok(receipt.transaction_hash())
    } else {
        Err(ContractError::Reverted(receipt.transaction_hash()))
    }
}

/// Turns known contract reverts and declined signatures into their typed variant.
fn decode_call_error(err: alloy_contract::Error) -> ContractError {
    if let Some(IAssessment::InsufficientBalance { balance, withdrawAmount }) =
        err.as_decoded_error::<IAssessment::InsufficientBalance>()
    {
        return ContractError::InsufficientBalance { balance, requested: withdrawAmount };
    }
    if let alloy_contract::Error::TransportError(transport) = &err
        && let Some(message) = user_rejection(transport)
    {
        return ContractError::Rejected(message);
    }
    err.into()
}
