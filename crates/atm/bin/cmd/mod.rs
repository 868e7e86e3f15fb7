use crate::args::SessionOpts;
use atm::{AtmConfig, AtmSession, RpcWallet};
use eyre::Result;

pub mod action;
pub mod shell;

/// Creates a disconnected session, looking for a wallet provider at the configured endpoint.
pub async fn session(opts: &SessionOpts, config: &AtmConfig) -> Result<AtmSession<RpcWallet>> {
    let signer = opts.wallet.signer()?;
    let wallet = RpcWallet::detect(config, signer).await;
    if wallet.is_none() {
        debug!(url = config.rpc_url(), "starting without a wallet provider");
    }
    Ok(AtmSession::from_config(wallet, config))
}
