use std::process::ExitCode;

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use zombabie_scripts::{cli::Cli, commands::deploy_staking_pools, errors::ScriptError};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => {
            info!("All done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Parse the configuration and run the deploy pipeline
async fn run() -> Result<(), ScriptError> {
    let cli = Cli::load_from(std::env::args_os())?;
    deploy_staking_pools(cli).await
}
