//! Definitions of CLI arguments for the deploy script

use std::{ffi::OsString, path::PathBuf};

use clap::Parser;

use crate::{
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_LEDGER_PATH, DEFAULT_POLL_INTERVAL_SECS,
        DEFAULT_POLL_TIMEOUT_SECS, DEFAULT_PROPAGATION_DELAY_SECS, NUM_DEPLOY_CONFIRMATIONS,
    },
    errors::ScriptError,
    types::{Network, NetworkConfig, WaitStrategy},
};

/// Deploy the Zombabie staking pools, record their addresses and verify
/// their sources on the block explorer
#[derive(Parser, Debug)]
pub struct Cli {
    /// The network to deploy to
    #[arg(short, long, env = "DEPLOY_NETWORK", default_value_t = Network::CronosTestnet)]
    pub network: Network,

    /// Network RPC URL, overriding the network preset
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Private keys of the signing accounts, comma-separated.
    /// The first one deploys
    #[arg(
        short,
        long,
        env = "DEPLOYER_PRIVATE_KEYS",
        value_delimiter = ',',
        hide_env_values = true
    )]
    pub priv_keys: Vec<String>,

    /// API key for the block explorer
    #[arg(long, env = "EXPLORER_API_KEY", hide_env_values = true)]
    pub explorer_api_key: Option<String>,

    /// Block explorer web UI base URL, overriding the network preset
    #[arg(long, env = "EXPLORER_URL")]
    pub explorer_url: Option<String>,

    /// Block explorer API URL, overriding the network preset
    #[arg(long, env = "EXPLORER_API_URL")]
    pub explorer_api_url: Option<String>,

    /// Legacy gas price in wei, overriding the network preset
    #[arg(long, env = "GAS_PRICE")]
    pub gas_price: Option<u128>,

    /// Confirmations to wait for on each deployment
    #[arg(
        long,
        env = "DEPLOY_CONFIRMATIONS",
        default_value_t = NUM_DEPLOY_CONFIRMATIONS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub confirmations: u64,

    /// Directory holding the Hardhat compilation artifacts
    #[arg(long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Path of the address ledger, replaced on every run
    #[arg(long, env = "LEDGER_PATH", default_value = DEFAULT_LEDGER_PATH)]
    pub ledger_path: PathBuf,

    /// How to wait for the explorer to index the deployments before verifying
    #[arg(long, env = "PROPAGATION_WAIT", default_value_t = WaitStrategy::Fixed)]
    pub wait_strategy: WaitStrategy,

    /// Duration of the fixed propagation delay
    #[arg(long, env = "PROPAGATION_DELAY_SECS", default_value_t = DEFAULT_PROPAGATION_DELAY_SECS)]
    pub propagation_delay_secs: u64,

    /// Interval between explorer index checks when polling
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    /// Upper bound on the polling wait, after which verification proceeds anyway
    #[arg(long, env = "POLL_TIMEOUT_SECS", default_value_t = DEFAULT_POLL_TIMEOUT_SECS)]
    pub poll_timeout_secs: u64,
}

impl Cli {
    /// Parse the given arguments, falling back to the environment.
    ///
    /// Help and version requests print and exit the process. Malformed values
    /// are returned as [`ScriptError::InvalidArguments`] so they fail the run
    /// like any other error.
    pub fn load_from<I, T>(args: I) -> Result<Self, ScriptError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(cli),
            Err(e) if !e.use_stderr() => e.exit(),
            Err(e) => {
                let msg = e.to_string();
                let msg = msg.trim_end();
                Err(ScriptError::InvalidArguments(
                    msg.strip_prefix("error: ").unwrap_or(msg).to_string(),
                ))
            }
        }
    }

    /// The selected network's preset with any overrides applied
    pub fn network_config(&self) -> NetworkConfig {
        let mut config = self.network.preset();
        if let Some(rpc_url) = &self.rpc_url {
            config.rpc_url = rpc_url.clone();
        }
        if let Some(explorer_url) = &self.explorer_url {
            config.explorer_url = explorer_url.clone();
        }
        if let Some(explorer_api_url) = &self.explorer_api_url {
            config.explorer_api_url = explorer_api_url.clone();
        }
        if self.gas_price.is_some() {
            config.gas_price = self.gas_price;
        }

        config
    }
}
