//! The ATM session manager.
//!
//! An [`AtmSession`] starts disconnected. [`AtmSession::connect`] asks the wallet for an account
//! and binds the contract to it; from then on the session dispatches actions to the contract and
//! mirrors the balance, pause flag and the client-observed time of the last deposit and
//! withdrawal. [`AtmSession::disconnect_wallet`] returns it to the disconnected state.
//!
//! Transaction failures never escape an action: they are logged and reported as
//! [`ActionOutcome::Failed`], leaving the mirrored state untouched.

use crate::{
    config::AtmConfig,
    contract::{AtmAction, AtmContract},
    error::SessionError,
    wallet::WalletProvider,
};
use alloy_primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use std::fmt;

/// Client-side mirror of the connected account's state.
///
/// Nothing here is authoritative: the contract is the source of truth and these fields only
/// converge with it on [`AtmSession::refresh_balance`] and [`AtmSession::reconcile`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The connected account.
    pub account: Option<Address>,
    /// The last balance read from the contract.
    pub balance: Option<U256>,
    /// When the last deposit was confirmed, as observed by this client.
    pub last_deposit: Option<DateTime<Utc>>,
    /// When the last withdrawal was confirmed, as observed by this client.
    pub last_withdrawal: Option<DateTime<Utc>>,
    /// Whether the contract is paused.
    pub paused: bool,
}

/// Why an action was not submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The contract is paused.
    Paused,
    /// No account is connected.
    NotConnected,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paused => f.write_str("the contract is paused"),
            Self::NotConnected => f.write_str("no wallet is connected"),
        }
    }
}

/// The result of a dispatched action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The transaction was confirmed.
    Confirmed { tx_hash: TxHash },
    /// Nothing was submitted.
    Skipped(SkipReason),
    /// The transaction was rejected, reverted or could not be confirmed.
    Failed(String),
}

impl ActionOutcome {
    /// Returns `true` if the transaction was confirmed.
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Returns the hash of the confirmed transaction.
    pub const fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Confirmed { tx_hash } => Some(*tx_hash),
            _ => None,
        }
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed { tx_hash } => write!(f, "confirmed {tx_hash}"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// What the user should currently be shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionView {
    /// No wallet provider is available.
    InstallPrompt,
    /// A provider is available but no account is connected.
    ConnectPrompt,
    /// An account is connected.
    Dashboard(Dashboard),
}

/// The state shown while connected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub account: Address,
    pub balance: Option<U256>,
    pub last_deposit: Option<DateTime<Utc>>,
    pub last_withdrawal: Option<DateTime<Utc>>,
    pub paused: bool,
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstallPrompt => {
                f.write_str("Please install a wallet provider in order to use this ATM.")
            }
            Self::ConnectPrompt => f.write_str("Please connect your wallet."),
            Self::Dashboard(dashboard) => dashboard.fmt(f),
        }
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = |time: &Option<DateTime<Utc>>| match time {
            Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => "never".to_string(),
        };
        writeln!(f, "Your Account: {}", self.account)?;
        match self.balance {
            Some(balance) => writeln!(f, "Your Balance: {balance}")?,
            None => writeln!(f, "Your Balance: unknown")?,
        }
        writeln!(f, "Last Withdrawal Time: {}", time(&self.last_withdrawal))?;
        writeln!(f, "Last Deposit Time: {}", time(&self.last_deposit))?;
        write!(f, "Contract Paused: {}", if self.paused { "Yes" } else { "No" })
    }
}

/// Connection lifecycle and action dispatch for one user.
///
/// Every operation takes `&mut self`, so a session has at most one action in flight.
pub struct AtmSession<W> {
    /// The wallet provider, `None` if none was found.
    wallet: Option<W>,
    /// The deployment address of the ATM contract.
    contract_address: Address,
    /// The fixed amount moved by deposits and withdrawals.
    amount: U256,
    /// The contract bound to the connected account. Only set while `state.account` is.
    contract: Option<Box<dyn AtmContract>>,
    state: SessionState,
}

impl<W> fmt::Debug for AtmSession<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtmSession")
            .field("has_wallet", &self.wallet.is_some())
            .field("contract_address", &self.contract_address)
            .field("amount", &self.amount)
            .field("state", &self.state)
            .finish()
    }
}

impl<W: WalletProvider> AtmSession<W> {
    /// Creates a disconnected session for the contract deployed at `contract_address`.
    pub fn new(wallet: Option<W>, contract_address: Address) -> Self {
        Self {
            wallet,
            contract_address,
            amount: U256::from(1),
            contract: None,
            state: SessionState::default(),
        }
    }

    /// Creates a disconnected session using the contract and amount of `config`.
    pub fn from_config(wallet: Option<W>, config: &AtmConfig) -> Self {
        Self::new(wallet, config.contract).with_amount(config.amount())
    }

    /// Sets the amount moved by deposits and withdrawals.
    pub fn with_amount(mut self, amount: U256) -> Self {
        self.amount = amount;
        self
    }

    /// The mirrored session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The connected account.
    pub fn account(&self) -> Option<Address> {
        self.state.account
    }

    /// The last balance read from the contract.
    pub fn balance(&self) -> Option<U256> {
        self.state.balance
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn is_connected(&self) -> bool {
        self.contract.is_some()
    }

    pub fn has_provider(&self) -> bool {
        self.wallet.is_some()
    }

    /// The amount moved by deposits and withdrawals.
    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// Derives what the user should be shown.
    pub fn view(&self) -> SessionView {
        if self.wallet.is_none() {
            return SessionView::InstallPrompt;
        }
        match self.state.account {
            Some(account) => SessionView::Dashboard(Dashboard {
                account,
                balance: self.state.balance,
                last_deposit: self.state.last_deposit,
                last_withdrawal: self.state.last_withdrawal,
                paused: self.state.paused,
            }),
            None => SessionView::ConnectPrompt,
        }
    }

    /// Requests account access and binds the contract to the first account returned.
    ///
    /// On success the balance is read right away.
    pub async fn connect(&mut self) -> Result<Address, SessionError> {
        let Some(wallet) = &self.wallet else {
            warn!("cannot connect: no wallet provider");
            return Err(SessionError::ProviderUnavailable);
        };

        let accounts = wallet.request_accounts().await?;
        let Some(&account) = accounts.first() else {
            warn!("wallet returned no accounts");
            return Err(SessionError::NoAccounts);
        };

        self.attach(account);
        self.refresh_balance().await;
        Ok(account)
    }

    /// Reconnects to an account the wallet already authorized, without prompting.
    ///
    /// Returns the account if one was found.
    pub async fn restore(&mut self) -> Option<Address> {
        let wallet = self.wallet.as_ref()?;
        let account = match wallet.accounts().await {
            Ok(accounts) => *accounts.first()?,
            Err(err) => {
                warn!(%err, "failed to query authorized accounts");
                return None;
            }
        };

        self.attach(account);
        self.refresh_balance().await;
        Some(account)
    }

    fn attach(&mut self, account: Address) {
        let Some(wallet) = &self.wallet else { return };
        let contract = wallet.bind(self.contract_address, account);
        info!(%account, contract = %self.contract_address, "account connected");
        self.contract = Some(contract);
        self.state.account = Some(account);
    }

    /// Reads the balance from the contract. Does nothing while disconnected.
    pub async fn refresh_balance(&mut self) -> Option<U256> {
        let contract = self.contract.as_ref()?;
        match contract.get_balance().await {
            Ok(balance) => {
                trace!(%balance, "refreshed balance");
                self.state.balance = Some(balance);
                Some(balance)
            }
            Err(err) => {
                error!(%err, "failed to query balance");
                None
            }
        }
    }

    /// Refreshes the balance and the pause flag from the contract.
    pub async fn reconcile(&mut self) {
        if self.contract.is_none() {
            return;
        }
        self.refresh_balance().await;
        self.refresh_paused().await;
    }

    async fn refresh_paused(&mut self) {
        let Some(contract) = &self.contract else { return };
        match contract.paused().await {
            Ok(paused) => {
                if paused != self.state.paused {
                    debug!(paused, "pause flag diverged from the contract");
                }
                self.state.paused = paused;
            }
            Err(err) => warn!(%err, "failed to query pause flag, keeping the local one"),
        }
    }

    /// Deposits the configured amount.
    pub async fn deposit(&mut self) -> ActionOutcome {
        let outcome = self.transfer(AtmAction::Deposit(self.amount)).await;
        if outcome.is_confirmed() {
            self.state.last_deposit = Some(Utc::now());
        }
        outcome
    }

    /// Withdraws the configured amount.
    pub async fn withdraw(&mut self) -> ActionOutcome {
        let outcome = self.transfer(AtmAction::Withdraw(self.amount)).await;
        if outcome.is_confirmed() {
            self.state.last_withdrawal = Some(Utc::now());
        }
        outcome
    }

    async fn transfer(&mut self, action: AtmAction) -> ActionOutcome {
        if self.contract.is_some() && self.state.paused {
            debug!(%action, "contract is paused, not submitting");
            return ActionOutcome::Skipped(SkipReason::Paused);
        }
        let outcome = self.dispatch(action).await;
        if outcome.is_confirmed() {
            self.refresh_balance().await;
        }
        outcome
    }

    /// Pauses the contract.
    pub async fn pause_contract(&mut self) -> ActionOutcome {
        self.toggle_pause(AtmAction::Pause, true).await
    }

    /// Resumes the contract.
    pub async fn resume_contract(&mut self) -> ActionOutcome {
        self.toggle_pause(AtmAction::Resume, false).await
    }

    async fn toggle_pause(&mut self, action: AtmAction, paused: bool) -> ActionOutcome {
        let outcome = self.dispatch(action).await;
        if outcome.is_confirmed() {
            self.state.paused = paused;
            self.refresh_paused().await;
        }
        outcome
    }

    /// Sends the disconnect transaction and, once confirmed, returns to the disconnected state.
    ///
    /// The pause flag is kept.
    pub async fn disconnect_wallet(&mut self) -> ActionOutcome {
        let outcome = self.dispatch(AtmAction::Disconnect).await;
        if outcome.is_confirmed() {
            info!(account = ?self.state.account, "account disconnected");
            self.contract = None;
            self.state = SessionState { paused: self.state.paused, ..Default::default() };
        }
        outcome
    }

    /// Submits `action` and waits for its confirmation, logging any failure.
    async fn dispatch(&self, action: AtmAction) -> ActionOutcome {
        let Some(contract) = &self.contract else {
            debug!(%action, "not connected, not submitting");
            return ActionOutcome::Skipped(SkipReason::NotConnected);
        };

        let pending = match contract.submit(action).await {
            Ok(pending) => pending,
            Err(err) => {
                error!(%action, %err, "failed to submit transaction");
                return ActionOutcome::Failed(err.to_string());
            }
        };

        let tx_hash = pending.tx_hash();
        debug!(%action, %tx_hash, "waiting for confirmation");
        match pending.confirmed().await {
            Ok(tx_hash) => {
                info!(%action, %tx_hash, "transaction confirmed");
                ActionOutcome::Confirmed { tx_hash }
            }
            Err(err) => {
                error!(%action, %tx_hash, %err, "transaction failed");
                ActionOutcome::Failed(err.to_string())
            }
        }
    }
}
