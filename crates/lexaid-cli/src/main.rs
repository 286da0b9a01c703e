//! LexAid CLI entry point

mod logging;
mod router;

use anyhow::Result;
use clap::Parser;

use crate::router::{Cli, CommandRouter};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; variables may come from the shell
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    tracing::debug!("Starting LexAid CLI");

    match CommandRouter::execute(cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Command failed: {:#}", e);
            Err(e)
        }
    }
}
