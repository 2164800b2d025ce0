//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::primitives::Address;
use clap::ValueEnum;

use crate::constants::{
    CRONOS_CHAIN_ID, CRONOS_EXPLORER_API_URL, CRONOS_EXPLORER_URL, CRONOS_GAS_PRICE,
    CRONOS_LEDGER_HEADER, CRONOS_RPC_URL, CRONOS_TESTNET_CHAIN_ID, CRONOS_TESTNET_EXPLORER_API_URL,
    CRONOS_TESTNET_EXPLORER_URL, CRONOS_TESTNET_LEDGER_HEADER, CRONOS_TESTNET_RPC_URL,
};

/// The networks the staking pools can be deployed to
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Network {
    /// The Cronos testnet
    CronosTestnet,
    /// The Cronos mainnet
    Cronos,
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::CronosTestnet => write!(f, "cronos-testnet"),
            Network::Cronos => write!(f, "cronos"),
        }
    }
}

impl Network {
    /// The connection and explorer settings for this network
    pub fn preset(&self) -> NetworkConfig {
        match self {
            Network::CronosTestnet => NetworkConfig {
                rpc_url: CRONOS_TESTNET_RPC_URL.to_string(),
                chain_id: CRONOS_TESTNET_CHAIN_ID,
                explorer_url: CRONOS_TESTNET_EXPLORER_URL.to_string(),
                explorer_api_url: CRONOS_TESTNET_EXPLORER_API_URL.to_string(),
                ledger_header: CRONOS_TESTNET_LEDGER_HEADER.to_string(),
                gas_price: Some(CRONOS_GAS_PRICE),
            },
            Network::Cronos => NetworkConfig {
                rpc_url: CRONOS_RPC_URL.to_string(),
                chain_id: CRONOS_CHAIN_ID,
                explorer_url: CRONOS_EXPLORER_URL.to_string(),
                explorer_api_url: CRONOS_EXPLORER_API_URL.to_string(),
                ledger_header: CRONOS_LEDGER_HEADER.to_string(),
                gas_price: Some(CRONOS_GAS_PRICE),
            },
        }
    }
}

/// Connection and explorer settings for a network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    /// The JSON-RPC endpoint
    pub rpc_url: String,
    /// The chain ID the RPC endpoint is expected to report
    pub chain_id: u64,
    /// The base URL of the block explorer's web UI
    pub explorer_url: String,
    /// The Etherscan-compatible API of the block explorer
    pub explorer_api_url: String,
    /// The first line of the address ledger
    pub ledger_header: String,
    /// The legacy gas price to deploy with, if any
    pub gas_price: Option<u128>,
}

/// The propagation wait strategies selectable from the CLI
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Sleep for a fixed duration
    Fixed,
    /// Poll the explorer until every deployment is indexed
    Poll,
}

impl Display for WaitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitStrategy::Fixed => write!(f, "fixed"),
            WaitStrategy::Poll => write!(f, "poll"),
        }
    }
}

/// A single entry of the deployment plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentTask {
    /// The name of the contract to deploy, as it appears in the compilation artifacts
    pub contract: String,
    /// The constructor arguments, coerced to the constructor's ABI types at deploy time
    pub constructor_args: Vec<String>,
    /// The name recorded in the address ledger
    pub label: String,
}

impl DeploymentTask {
    /// Create a new deployment task
    pub fn new<S: Into<String>>(
        contract: impl Into<String>,
        constructor_args: impl IntoIterator<Item = S>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            contract: contract.into(),
            constructor_args: constructor_args.into_iter().map(Into::into).collect(),
            label: label.into(),
        }
    }
}

/// A contract whose deployment has been confirmed on-chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    /// The ledger label of the task that produced this contract
    pub label: String,
    /// The name of the deployed contract
    pub contract: String,
    /// The address the contract was deployed at
    pub address: Address,
    /// The exact constructor arguments used in the deployment
    pub constructor_args: Vec<String>,
}

impl DeployedContract {
    /// Record the confirmed deployment of `task` at `address`
    pub fn new(task: &DeploymentTask, address: Address) -> Self {
        Self {
            label: task.label.clone(),
            contract: task.contract.clone(),
            address,
            constructor_args: task.constructor_args.clone(),
        }
    }
}

/// The result of a successful verification request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The explorer accepted and verified the source
    Verified,
    /// The explorer already had the source verified
    AlreadyVerified,
}
