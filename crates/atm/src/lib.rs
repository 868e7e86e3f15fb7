//! # atm
//!
//! Session manager connecting a wallet provider to a deployed ATM contract.
//!
//! The [`AtmSession`] owns the connection lifecycle (`Disconnected -> Connected -> Disconnected`)
//! and dispatches deposit, withdraw, pause, resume and disconnect actions to the contract through
//! the [`WalletProvider`] and [`AtmContract`] collaborators.

#[macro_use]
extern crate tracing;

#[macro_use]
pub mod io;

pub mod config;
pub mod contract;
pub mod error;
pub mod handler;
pub mod session;
pub mod utils;
pub mod wallet;

pub use config::AtmConfig;
pub use contract::{AtmAction, AtmContract, ChainAtm, PendingAction};
pub use error::{ContractError, SessionError, WalletError};
pub use session::{ActionOutcome, AtmSession, Dashboard, SessionState, SessionView, SkipReason};
pub use wallet::{RpcWallet, WalletOpts, WalletProvider};
