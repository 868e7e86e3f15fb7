//! In-memory wallet and contract used to drive sessions without a node.

use alloy_primitives::{Address, TxHash, U256, address};
use alloy_transport::TransportErrorKind;
use async_trait::async_trait;
use atm::{
    AtmAction, AtmContract, AtmSession, ContractError, PendingAction, WalletError, WalletProvider,
};
use parking_lot::Mutex;
use std::sync::Arc;

pub const CONTRACT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
pub const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

/// Contract state shared by every handle bound to it.
#[derive(Debug, Default)]
pub struct Chain {
    pub balance: U256,
    pub paused: bool,
    /// Every action handed to the contract, in order.
    pub submitted: Vec<AtmAction>,
    /// Accounts that called `disconnectWallet`.
    pub disconnected: Vec<Address>,
    /// Declines the next submission as a wallet would.
    pub reject_next: bool,
    /// Reverts the next submission once mined.
    pub revert_next: bool,
    /// Makes every read fail.
    pub fail_reads: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MockChain(Arc<Mutex<Chain>>);

impl MockChain {
    pub fn with_balance(balance: u64) -> Self {
        let chain = Self::default();
        chain.0.lock().balance = U256::from(balance);
        chain
    }

    pub fn state(&self) -> parking_lot::MutexGuard<'_, Chain> {
        self.0.lock()
    }

    pub fn submitted(&self) -> Vec<AtmAction> {
        self.0.lock().submitted.clone()
    }
}

#[derive(Debug)]
pub struct MockWallet {
    chain: MockChain,
    /// Returned by `request_accounts`.
    pub accounts: Vec<Address>,
    /// Returned by `accounts`.
    pub authorized: Vec<Address>,
    /// Declines account requests.
    pub reject: bool,
}

impl MockWallet {
    pub fn new(chain: &MockChain) -> Self {
        Self { chain: chain.clone(), accounts: vec![ALICE], authorized: vec![], reject: false }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.reject {
            return Err(WalletError::Rejected("User rejected the request.".to_string()));
        }
        Ok(self.accounts.clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.authorized.clone())
    }

    fn bind(&self, contract: Address, account: Address) -> Box<dyn AtmContract> {
        Box::new(MockAtm { chain: self.chain.clone(), address: contract, account })
    }
}

#[derive(Debug)]
pub struct MockAtm {
    chain: MockChain,
    address: Address,
    account: Address,
}

#[async_trait]
impl AtmContract for MockAtm {
    fn address(&self) -> Address {
        self.address
    }

    fn account(&self) -> Address {
        self.account
    }

    async fn get_balance(&self) -> Result<U256, ContractError> {
        let chain = self.chain.state();
        if chain.fail_reads {
            return Err(node_unavailable());
        }
        Ok(chain.balance)
    }

    async fn paused(&self) -> Result<bool, ContractError> {
        let chain = self.chain.state();
        if chain.fail_reads {
            return Err(node_unavailable());
        }
        Ok(chain.paused)
    }

    async fn submit(&self, action: AtmAction) -> Result<PendingAction, ContractError> {
        let mut chain = self.chain.state();
        if std::mem::take(&mut chain.reject_next) {
            return Err(ContractError::Rejected("User denied transaction signature.".to_string()));
        }
        if let AtmAction::Withdraw(requested) = action
            && requested > chain.balance
        {
            return Err(ContractError::InsufficientBalance { balance: chain.balance, requested });
        }
        chain.submitted.push(action);
        let revert = std::mem::take(&mut chain.revert_next);
        drop(chain);

        let tx_hash = TxHash::random();
        let state = self.chain.clone();
        let account = self.account;
        Ok(PendingAction::new(tx_hash, async move {
            if revert {
                return Err(ContractError::Reverted(tx_hash));
            }
            let mut chain = state.state();
            match action {
                AtmAction::Deposit(amount) => chain.balance += amount,
                AtmAction::Withdraw(amount) => chain.balance -= amount,
                AtmAction::Pause => chain.paused = true,
                AtmAction::Resume => chain.paused = false,
                AtmAction::Disconnect => chain.disconnected.push(account),
            }
            Ok(tx_hash)
        }))
    }
}

fn node_unavailable() -> ContractError {
    alloy_contract::Error::from(TransportErrorKind::custom_str("node unavailable")).into()
}

/// A session with a wallet provider over `chain`, not yet connected.
pub fn session(chain: &MockChain) -> AtmSession<MockWallet> {
    AtmSession::new(Some(MockWallet::new(chain)), CONTRACT)
}

/// A session connected to [`ALICE`].
pub async fn connected(chain: &MockChain) -> AtmSession<MockWallet> {
    let mut session = session(chain);
    session.connect().await.unwrap();
    session
}
