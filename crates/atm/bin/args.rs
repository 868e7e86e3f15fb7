use crate::cmd::{action::ActionArgs, shell::ShellArgs};
use alloy_primitives::Address;
use atm::{AtmConfig, WalletOpts};
use clap::{Parser, Subcommand};
use eyre::Result;
use figment::{
    Metadata, Profile,
    value::{Dict, Map, Value},
};
use serde::Serialize;

/// Drive a deployed ATM contract from the command line.
#[derive(Debug, Parser)]
#[command(name = "atm", version, next_display_order = None)]
pub struct Atm {
    #[command(flatten)]
    pub opts: SessionOpts,

    #[command(subcommand)]
    pub cmd: AtmSubcommand,
}

impl Atm {
    pub async fn run(self) -> Result<()> {
        let Self { opts, cmd } = self;
        let config = AtmConfig::load_with(&opts)?;
        match cmd {
            AtmSubcommand::Shell(args) => args.run(&opts, &config).await,
            AtmSubcommand::Status => ActionArgs::Status.run(&opts, &config).await,
            AtmSubcommand::Balance => ActionArgs::Balance.run(&opts, &config).await,
            AtmSubcommand::Deposit => ActionArgs::Deposit.run(&opts, &config).await,
            AtmSubcommand::Withdraw => ActionArgs::Withdraw.run(&opts, &config).await,
            AtmSubcommand::Pause => ActionArgs::Pause.run(&opts, &config).await,
            AtmSubcommand::Resume => ActionArgs::Resume.run(&opts, &config).await,
            AtmSubcommand::Disconnect => ActionArgs::Disconnect.run(&opts, &config).await,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum AtmSubcommand {
    /// Show the session state of the connected account.
    #[command(visible_alias = "st")]
    Status,

    /// Read the balance held by the contract.
    #[command(visible_alias = "b")]
    Balance,

    /// Deposit the configured amount.
    #[command(visible_alias = "d")]
    Deposit,

    /// Withdraw the configured amount.
    #[command(visible_alias = "w")]
    Withdraw,

    /// Pause the contract.
    Pause,

    /// Resume the contract.
    Resume,

    /// Disconnect the account from the contract.
    Disconnect,

    /// Start an interactive session.
    #[command(visible_alias = "sh")]
    Shell(ShellArgs),
}

/// Options shared by all subcommands. Unset options fall back to `atm.toml` and `ATM_*`
/// environment variables.
#[derive(Clone, Debug, Default, Serialize, Parser)]
pub struct SessionOpts {
    /// The RPC endpoint of the wallet provider.
    #[arg(long, short, visible_alias = "rpc-url", value_name = "URL", env = "ETH_RPC_URL", global = true)]
    #[serde(rename = "eth_rpc_url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// The address of the deployed ATM contract.
    #[arg(long, value_name = "ADDRESS", global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<Address>,

    /// The amount moved by a deposit or a withdrawal.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,

    /// Number of confirmations to wait for.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,

    /// Seconds to wait for a confirmation.
    #[arg(long, value_name = "SECONDS", global = true)]
    #[serde(rename = "transaction_timeout", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[command(flatten)]
    #[serde(skip)]
    pub wallet: WalletOpts,
}

impl figment::Provider for SessionOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("SessionOpts")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let value = Value::serialize(self)?;
        let dict = value.into_dict().unwrap_or_default();
        Ok(Map::from([(Profile::Default, dict)]))
    }
}
