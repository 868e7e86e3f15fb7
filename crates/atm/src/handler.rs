//! Error reports of the `atm` binary.
//!
//! Errors are printed as their deduplicated chain of causes, followed by a hint when the failure is
//! one the user can fix. Setting `ATM_DEBUG` switches to the `color-eyre` report.

use crate::error::{SessionError, WalletError};
use eyre::EyreHandler;
use itertools::Itertools;
use std::{error::Error, fmt};
use yansi::Paint;

/// [`EyreHandler`] for the `atm` binary.
#[derive(Default)]
pub struct Handler {
    /// Replaces the short report when set.
    verbose: Option<Box<dyn EyreHandler>>,
}

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", dedup_chain(error).iter().format(": "))
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(verbose) = &self.verbose {
            return verbose.debug(error, f);
        }

        let mut causes = dedup_chain(error).into_iter();
        if let Some(error) = causes.next() {
            write!(f, "{error}")?;
        }
        for cause in causes {
            write!(f, "\n  caused by: {cause}")?;
        }
        if let Some(hint) = hint(error) {
            write!(f, "\n\n{} {hint}", "Hint:".cyan().bold())?;
        }
        Ok(())
    }

    fn track_caller(&mut self, location: &'static std::panic::Location<'static>) {
        if let Some(verbose) = &mut self.verbose {
            verbose.track_caller(location);
        }
    }
}

/// Installs the panic and [`eyre`] hooks.
pub fn install() {
    let verbose = std::env::var_os("ATM_DEBUG").is_some();
    let (panic_hook, eyre_hook) =
        color_eyre::config::HookBuilder::default().display_env_section(verbose).into_hooks();
    panic_hook.install();

    let eyre_hook = eyre_hook.into_eyre_hook();
    let installed = eyre::set_hook(Box::new(move |error| {
        Box::new(Handler { verbose: verbose.then(|| eyre_hook(error)) })
    }));
    if let Err(err) = installed {
        debug!(%err, "eyre hook already installed");
    }
}

/// Returns what the user can do about `error`, if anything.
pub fn hint(error: &(dyn Error + 'static)) -> Option<&'static str> {
    let error = eyre::Chain::new(error).find_map(|cause| cause.downcast_ref::<SessionError>())?;
    match error {
        SessionError::ProviderUnavailable => {
            Some("start a node at the configured RPC endpoint or pass `--rpc-url`")
        }
        SessionError::NoAccounts => {
            Some("unlock an account on the node or pass `--private-key`, `--mnemonic` or `--keystore`")
        }
        SessionError::Wallet(WalletError::Rejected(_)) => {
            Some("approve the account request in your wallet and try again")
        }
        SessionError::Wallet(_) => None,
    }
}

/// Collects the messages of an error chain, skipping causes already included in the message
/// before them.
pub fn dedup_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut causes = Vec::<String>::new();
    for cause in eyre::Chain::new(error) {
        let msg = cause.to_string();
        let msg = msg.trim();
        if msg.is_empty() || causes.last().is_some_and(|prev| prev.contains(msg)) {
            continue;
        }
        causes.push(msg.to_string());
    }
    causes
}
