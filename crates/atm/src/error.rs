use alloy_primitives::{TxHash, U256};
use alloy_signer_local::LocalSignerError;
use alloy_transport::TransportError;

/// EIP-1193 code for a request the user declined.
pub(crate) const USER_REJECTED_REQUEST: i64 = 4001;

/// Returns the wallet's message if `err` is a declined request.
pub(crate) fn user_rejection(err: &TransportError) -> Option<String> {
    err.as_error_resp()
        .filter(|resp| resp.code == USER_REJECTED_REQUEST)
        .map(|resp| resp.message.to_string())
}

/// Errors raised by a [`WalletProvider`](crate::WalletProvider).
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("the wallet rejected the account request: {0}")]
    Rejected(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Local(#[from] LocalSignerError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by an [`AtmContract`](crate::AtmContract) or while awaiting a confirmation.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("insufficient balance: {balance} available, {requested} requested")]
    InsufficientBalance { balance: U256, requested: U256 },
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("transaction rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Call(#[from] alloy_contract::Error),
    #[error(transparent)]
    Confirmation(#[from] alloy_provider::PendingTransactionError),
}

/// Errors surfaced to the user by [`AtmSession::connect`](crate::AtmSession::connect).
///
/// Transaction failures are not part of this type: they are logged and reported as
/// [`ActionOutcome::Failed`](crate::ActionOutcome::Failed).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no wallet provider is available")]
    ProviderUnavailable,
    #[error("the wallet did not return any account")]
    NoAccounts,
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Represents a failed attempt to extract an [`AtmConfig`](crate::AtmConfig).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("failed to extract atm config: {0}")]
pub struct ExtractConfigError(#[from] pub(crate) figment::Error);
