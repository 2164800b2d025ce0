//! Definitions of errors that can occur while deploying and verifying the staking pools

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Malformed command line arguments or environment variables
    InvalidArguments(String),
    /// Error initializing the RPC client or the explorer client
    ClientInitialization(String),
    /// The account provider returned no signing accounts
    NoSigners,
    /// Error locating or parsing a Hardhat compilation artifact
    ArtifactParsing(String),
    /// Error ABI-encoding constructor arguments
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error writing the address ledger
    WriteLedger(String),
    /// Error talking to the block explorer's API
    ExplorerRequest(String),
    /// The block explorer rejected a verification request
    Verification(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::InvalidArguments(s) => write!(f, "invalid arguments: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::NoSigners => write!(f, "no signing accounts available"),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::WriteLedger(s) => write!(f, "error writing address ledger: {}", s),
            ScriptError::ExplorerRequest(s) => write!(f, "error querying block explorer: {}", s),
            ScriptError::Verification(s) => write!(f, "error verifying contract: {}", s),
        }
    }
}

impl Error for ScriptError {}
