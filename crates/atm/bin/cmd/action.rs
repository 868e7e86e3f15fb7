use crate::args::SessionOpts;
use atm::{ActionOutcome, AtmConfig, SessionError};
use eyre::Result;

/// One-shot commands: connect, run a single operation and print the resulting view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionArgs {
    Status,
    Balance,
    Deposit,
    Withdraw,
    Pause,
    Resume,
    Disconnect,
}

impl ActionArgs {
    pub async fn run(self, opts: &SessionOpts, config: &AtmConfig) -> Result<()> {
        let mut session = super::session(opts, config).await?;

        if let Err(err) = session.connect().await {
            sh_println!("{}", session.view())?;
            return match err {
                // nothing to act on, but showing the install prompt is a valid status
                SessionError::ProviderUnavailable if self == Self::Status => Ok(()),
                err => Err(err.into()),
            };
        }

        let outcome = match self {
            Self::Status => {
                sh_println!("{}", session.view())?;
                return Ok(());
            }
            Self::Balance => {
                let Some(balance) = session.balance() else {
                    eyre::bail!("failed to read the balance of {}", config.contract)
                };
                sh_println!("{balance}")?;
                return Ok(());
            }
            Self::Deposit => session.deposit().await,
            Self::Withdraw => session.withdraw().await,
            Self::Pause => session.pause_contract().await,
            Self::Resume => session.resume_contract().await,
            Self::Disconnect => session.disconnect_wallet().await,
        };

        report(&outcome)?;
        sh_println!("{}", session.view())?;
        if let ActionOutcome::Failed(err) = outcome {
            eyre::bail!(err)
        }
        Ok(())
    }
}

/// Prints the outcome of an action.
pub fn report(outcome: &ActionOutcome) -> std::io::Result<()> {
    match outcome {
        ActionOutcome::Confirmed { tx_hash } => sh_println!("Transaction confirmed: {tx_hash}"),
        ActionOutcome::Skipped(reason) => sh_warn!("Nothing submitted, {reason}"),
        ActionOutcome::Failed(err) => sh_err!("Transaction failed: {err}"),
    }
}
