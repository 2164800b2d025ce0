//! The alloy-backed chain: signing accounts come from the configured private
//! keys, contract factories from the Hardhat artifacts

use alloy::{
    network::TransactionBuilder,
    primitives::Address,
    providers::{DynProvider, Provider},
    rpc::types::TransactionRequest,
};
use tracing::debug;

use crate::{
    artifacts::{ArtifactStore, ContractArtifact},
    errors::ScriptError,
    interfaces::{ChainBackend, ContractFactory},
};

/// A chain reached over JSON-RPC
#[derive(Clone)]
pub struct AlloyBackend {
    /// The provider, with a wallet holding every configured signer
    provider: DynProvider,
    /// The addresses of the configured signers, in priority order
    signers: Vec<Address>,
    /// Where contract artifacts are read from
    artifacts: ArtifactStore,
    /// The legacy gas price to deploy with, if any
    gas_price: Option<u128>,
    /// The confirmations to wait for on each deployment
    confirmations: u64,
}

impl AlloyBackend {
    /// Create a new backend
    pub fn new(
        provider: DynProvider,
        signers: Vec<Address>,
        artifacts: ArtifactStore,
        gas_price: Option<u128>,
        confirmations: u64,
    ) -> Self {
        Self {
            provider,
            signers,
            artifacts,
            gas_price,
            confirmations,
        }
    }
}

impl ChainBackend for AlloyBackend {
    type Factory = AlloyFactory;

    async fn signers(&self) -> Result<Vec<Address>, ScriptError> {
        Ok(self.signers.clone())
    }

    async fn contract_factory(&self, contract: &str) -> Result<AlloyFactory, ScriptError> {
        let artifact = self.artifacts.load(contract)?;
        Ok(AlloyFactory {
            provider: self.provider.clone(),
            artifact,
            gas_price: self.gas_price,
            confirmations: self.confirmations,
        })
    }
}

/// Deploys instances of one compiled contract
pub struct AlloyFactory {
    /// The provider the creation transactions are sent through
    provider: DynProvider,
    /// The compiled contract
    artifact: ContractArtifact,
    /// The legacy gas price to deploy with, if any
    gas_price: Option<u128>,
    /// The confirmations to wait for
    confirmations: u64,
}

impl ContractFactory for AlloyFactory {
    async fn deploy(
        &self,
        signer: Address,
        constructor_args: &[String],
    ) -> Result<Address, ScriptError> {
        let deploy_code = self.artifact.deploy_code(constructor_args)?;

        let mut tx = TransactionRequest::default()
            .with_from(signer)
            .with_deploy_code(deploy_code);
        if let Some(gas_price) = self.gas_price {
            tx.set_gas_price(gas_price);
        }

        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        debug!(
            contract = %self.artifact.contract_name,
            tx_hash = %pending_tx.tx_hash(),
            "deployment transaction sent"
        );

        let receipt = pending_tx
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::ContractDeployment(format!(
                "{} deployment reverted in {}",
                self.artifact.contract_name, receipt.transaction_hash
            )));
        }

        receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "receipt {} carries no contract address",
                receipt.transaction_hash
            ))
        })
    }
}
