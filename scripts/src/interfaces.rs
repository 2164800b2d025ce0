//! Interfaces to the external collaborators driven by the deploy pipeline.
//!
//! Every method suspends until the collaborator has finished; the pipeline never
//! issues a second call before the first resolves.

// The pipeline runs on a single task, so the futures need not be `Send`
#![allow(async_fn_in_trait)]

use alloy::primitives::Address;

use crate::{
    errors::ScriptError,
    types::{DeployedContract, VerificationOutcome},
};

/// A handle able to deploy new instances of one contract
pub trait ContractFactory {
    /// Deploy a new instance from `signer`, resolving once the creation
    /// transaction is confirmed
    async fn deploy(
        &self,
        signer: Address,
        constructor_args: &[String],
    ) -> Result<Address, ScriptError>;
}

/// The chain the contracts are deployed to, together with its accounts
pub trait ChainBackend {
    /// The factory type handed out for each contract
    type Factory: ContractFactory;

    /// The available signing accounts, in priority order
    async fn signers(&self) -> Result<Vec<Address>, ScriptError>;

    /// Look up a factory for the named contract
    async fn contract_factory(&self, contract: &str) -> Result<Self::Factory, ScriptError>;
}

/// A source verification service, e.g. a block explorer
pub trait SourceVerifier {
    /// Register the source of a deployed contract.
    ///
    /// A contract that is already verified yields
    /// [`VerificationOutcome::AlreadyVerified`], never an error.
    async fn verify(
        &self,
        deployed: &DeployedContract,
    ) -> Result<VerificationOutcome, ScriptError>;
}

/// The pause between deployment and verification that lets the explorer catch up
pub trait PropagationWait {
    /// Wait until the given deployments are (assumed to be) visible to the explorer
    async fn wait(&self, deployed: &[DeployedContract]) -> Result<(), ScriptError>;
}

/// A readiness check against the explorer's index
pub trait IndexProbe {
    /// Whether the explorer has indexed the contract at `address`
    async fn is_indexed(&self, address: Address) -> Result<bool, ScriptError>;
}
