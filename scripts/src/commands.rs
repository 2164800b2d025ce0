//! The deploy pipeline: deploy every planned contract, record the addresses in
//! the ledger, give the explorer time to index them, then verify their sources

use std::time::Duration;

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::{
    artifacts::ArtifactStore,
    chain::AlloyBackend,
    cli::Cli,
    constants::{
        EXPLORER_REQUEST_TIMEOUT_SECS, GEN2_COLLECTION_ADDRESS, STAKE_CONTRACT, STAKE_POOL_LABELS,
    },
    errors::ScriptError,
    explorer::ExplorerClient,
    interfaces::{ChainBackend, ContractFactory, PropagationWait, SourceVerifier},
    ledger::AddressLedger,
    types::{DeployedContract, DeploymentTask, VerificationOutcome, WaitStrategy},
    utils::setup_client,
    wait::{FixedDelay, PollUntilIndexed, Propagation},
};

/// The staking pools to deploy, in order
pub fn staking_pool_plan() -> Vec<DeploymentTask> {
    STAKE_POOL_LABELS
        .iter()
        .map(|label| DeploymentTask::new(STAKE_CONTRACT, [GEN2_COLLECTION_ADDRESS], *label))
        .collect()
}

/// Deploy and verify the staking pools on the network selected by the CLI
pub async fn deploy_staking_pools(cli: Cli) -> Result<(), ScriptError> {
    let network = cli.network_config();
    let explorer_api_key = cli.explorer_api_key.clone().ok_or_else(|| {
        ScriptError::ClientInitialization("no explorer API key configured".to_string())
    })?;

    let (provider, signers) = setup_client(&cli.priv_keys, &network.rpc_url, network.chain_id).await?;
    let artifacts = ArtifactStore::new(&cli.artifacts_dir);
    let backend = AlloyBackend::new(
        provider,
        signers,
        artifacts.clone(),
        network.gas_price,
        cli.confirmations,
    );

    let explorer = ExplorerClient::new(
        &network.explorer_api_url,
        explorer_api_key,
        artifacts,
        Duration::from_secs(EXPLORER_REQUEST_TIMEOUT_SECS),
    )?;
    let propagation = match cli.wait_strategy {
        WaitStrategy::Fixed => {
            Propagation::Fixed(FixedDelay::new(Duration::from_secs(cli.propagation_delay_secs)))
        }
        WaitStrategy::Poll => Propagation::Poll(PollUntilIndexed::new(
            explorer.clone(),
            Duration::from_secs(cli.poll_interval_secs),
            Duration::from_secs(cli.poll_timeout_secs),
        )),
    };
    let ledger = AddressLedger::new(&cli.ledger_path, &network.explorer_url);

    Orchestrator::new(staking_pool_plan(), backend, explorer, propagation, ledger)
        .with_ledger_header(network.ledger_header)
        .run()
        .await
}

/// Drives a deployment plan through deployment, ledger, propagation and
/// verification, strictly one step at a time
pub struct Orchestrator<B, V, W> {
    /// The tasks to deploy, in order
    plan: Vec<DeploymentTask>,
    /// The chain the contracts are deployed to
    backend: B,
    /// The source verification service
    verifier: V,
    /// The pause between deployment and verification
    propagation: W,
    /// The address ledger
    ledger: AddressLedger,
    /// The first line of the ledger
    ledger_header: String,
    /// The contracts confirmed so far in this run
    deployed: Vec<DeployedContract>,
}

impl<B, V, W> Orchestrator<B, V, W>
where
    B: ChainBackend,
    V: SourceVerifier,
    W: PropagationWait,
{
    /// Create a new orchestrator
    pub fn new(
        plan: Vec<DeploymentTask>,
        backend: B,
        verifier: V,
        propagation: W,
        ledger: AddressLedger,
    ) -> Self {
        Self {
            plan,
            backend,
            verifier,
            propagation,
            ledger,
            ledger_header: String::new(),
            deployed: Vec::new(),
        }
    }

    /// Set the first line of the ledger
    pub fn with_ledger_header(mut self, header: impl Into<String>) -> Self {
        self.ledger_header = header.into();
        self
    }

    /// The contracts confirmed so far, in deployment order
    pub fn deployed(&self) -> &[DeployedContract] {
        &self.deployed
    }

    /// Run the whole pipeline, stopping at the first unrecoverable error
    pub async fn run(&mut self) -> Result<(), ScriptError> {
        info!("Starting deployments");
        let deployer = self.resolve_signer().await?;
        self.deploy_contracts(deployer).await?;

        self.ledger.write(&self.ledger_header, &self.deployed)?;
        info!(
            ledger = %self.ledger.path().display(),
            "Deployments done, waiting for explorer verifications"
        );

        self.propagation.wait(&self.deployed).await?;
        self.verify_contracts().await
    }

    /// The first signing account is the deployer
    async fn resolve_signer(&self) -> Result<Address, ScriptError> {
        let deployer = self
            .backend
            .signers()
            .await?
            .into_iter()
            .next()
            .ok_or(ScriptError::NoSigners)?;
        info!("Deploying from {}", deployer);

        Ok(deployer)
    }

    /// Deploy every task in order, each only after the previous one is confirmed
    async fn deploy_contracts(&mut self, deployer: Address) -> Result<(), ScriptError> {
        self.deployed.clear();

        for task in &self.plan {
            let address = match deploy_task(&self.backend, deployer, task).await {
                Ok(address) => address,
                Err(e) => {
                    warn!(label = %task.label, "Deployment failed");
                    self.report_orphans();
                    return Err(e);
                }
            };

            info!("{} deployed at {}", task.label, address);
            self.deployed.push(DeployedContract::new(task, address));
        }

        Ok(())
    }

    /// Log the contracts a failed run leaves on-chain without a ledger entry
    fn report_orphans(&self) {
        for contract in &self.deployed {
            warn!(
                "{} was deployed at {} but is not recorded in the ledger",
                contract.label, contract.address
            );
        }
    }

    /// Verify every deployed contract in order, stopping at the first failure
    async fn verify_contracts(&self) -> Result<(), ScriptError> {
        for contract in &self.deployed {
            match self.verifier.verify(contract).await? {
                VerificationOutcome::Verified => info!("{} verified", contract.label),
                VerificationOutcome::AlreadyVerified => {
                    info!("{} already verified", contract.label)
                }
            }
        }

        Ok(())
    }
}

/// Deploy a single task and wait for its confirmation
async fn deploy_task<B: ChainBackend>(
    backend: &B,
    deployer: Address,
    task: &DeploymentTask,
) -> Result<Address, ScriptError> {
    let factory = backend.contract_factory(&task.contract).await?;
    factory.deploy(deployer, &task.constructor_args).await
}
