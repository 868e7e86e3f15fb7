use super::action::report;
use crate::args::SessionOpts;
use atm::{AtmConfig, AtmSession, WalletProvider};
use clap::Parser;
use eyre::Result;
use std::time::Duration;
use strum::{EnumString, IntoStaticStr};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{Instant, Interval, MissedTickBehavior},
};

const HELP: &str = "\
Commands:
  connect     Connect a wallet account
  balance     Read the balance from the contract
  deposit     Deposit the configured amount
  withdraw    Withdraw the configured amount
  pause       Pause the contract
  resume      Resume the contract
  disconnect  Disconnect the account from the contract
  reconcile   Refresh balance and pause flag from the contract
  status      Show the session state
  help        Show this message
  quit        Leave the shell";

/// CLI arguments for `atm shell`.
#[derive(Clone, Debug, Parser)]
pub struct ShellArgs {
    /// Seconds between reconciliations with the contract, `0` disables them.
    ///
    /// Defaults to `refresh_interval` from the configuration.
    #[arg(long, value_name = "SECONDS")]
    pub refresh_interval: Option<u64>,
}

impl ShellArgs {
    pub async fn run(self, opts: &SessionOpts, config: &AtmConfig) -> Result<()> {
        let session = super::session(opts, config).await?;
        let refresh = match self.refresh_interval {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => config.refresh_interval(),
        };
        run_shell(session, refresh).await
    }
}

/// A line entered in the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ShellCommand {
    Connect,
    Balance,
    Deposit,
    Withdraw,
    Pause,
    Resume,
    Disconnect,
    Reconcile,
    Status,
    #[strum(to_string = "help", serialize = "?")]
    Help,
    #[strum(to_string = "quit", serialize = "exit", serialize = "q")]
    Quit,
}

/// Reads commands from stdin until EOF or `quit`, reconciling with the contract every `refresh`.
async fn run_shell<W: WalletProvider>(
    mut session: AtmSession<W>,
    refresh: Option<Duration>,
) -> Result<()> {
    if let Some(account) = session.restore().await {
        sh_println!("Account connected: {account}")?;
    }
    sh_println!("{}", session.view())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = refresh.map(reconcile_ticker);

    sh_print!("atm> ")?;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            () = tick(ticker.as_mut()) => {
                trace!("periodic reconciliation");
                session.reconcile().await;
                continue;
            }
        };
        let Some(line) = line else { break };
        let line = line.trim();

        if !line.is_empty() {
            match line.parse::<ShellCommand>() {
                Ok(ShellCommand::Quit) => break,
                Ok(cmd) => execute(&mut session, cmd).await?,
                Err(_) => sh_err!("unknown command `{line}`, type `help` for a list")?,
            }
        }
        sh_print!("atm> ")?;
    }
    sh_println!()?;
    Ok(())
}

async fn execute<W: WalletProvider>(session: &mut AtmSession<W>, cmd: ShellCommand) -> Result<()> {
    let name: &'static str = cmd.into();
    trace!(cmd = name, "executing");

    let outcome = match cmd {
        ShellCommand::Connect => {
            match session.connect().await {
                Ok(account) => sh_println!("Account connected: {account}")?,
                Err(err) => sh_err!("{err}")?,
            }
            None
        }
        ShellCommand::Balance => {
            match session.refresh_balance().await {
                Some(balance) => sh_println!("{balance}")?,
                None if session.is_connected() => sh_err!("failed to read the balance")?,
                None => sh_warn!("no wallet is connected")?,
            }
            return Ok(());
        }
        ShellCommand::Deposit => Some(session.deposit().await),
        ShellCommand::Withdraw => Some(session.withdraw().await),
        ShellCommand::Pause => Some(session.pause_contract().await),
        ShellCommand::Resume => Some(session.resume_contract().await),
        ShellCommand::Disconnect => Some(session.disconnect_wallet().await),
        ShellCommand::Reconcile => {
            session.reconcile().await;
            None
        }
        ShellCommand::Status => None,
        ShellCommand::Help => {
            sh_println!("{HELP}")?;
            return Ok(());
        }
        ShellCommand::Quit => return Ok(()),
    };

    if let Some(outcome) = outcome {
        report(&outcome)?;
    }
    sh_println!("{}", session.view())?;
    Ok(())
}

/// Ticks every `period`, starting one period from now. Ticks missed while a command runs are not
/// replayed.
fn reconcile_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
