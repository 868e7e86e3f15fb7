#[macro_use]
extern crate tracing;

#[macro_use]
extern crate atm;

use atm::{handler, utils};
use clap::Parser;
use eyre::Result;

pub mod args;
pub mod cmd;

use args::Atm;

fn main() -> Result<()> {
    handler::install();
    utils::load_dotenv();
    utils::subscriber();
    utils::enable_paint();
    let args = Atm::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: Atm) -> Result<()> {
    trace!(?args.cmd, "running");
    args.run().await
}
