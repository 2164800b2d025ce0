//! Constants used in the deploy scripts

// --- Deployment plan --- //

/// The contract type deployed for every staking pool
pub const STAKE_CONTRACT: &str = "ZombabieStake";

/// The gen-2 Zombabies NFT collection, staked in pools 2 through 5
pub const GEN2_COLLECTION_ADDRESS: &str = "0x8ee54067dbb58d872424050234df6162aa27c06d";

/// Ledger labels of the staking pools, in deployment order
pub const STAKE_POOL_LABELS: [&str; 4] = [
    "ZombabieStakePool2Contract",
    "ZombabieStakePool3Contract",
    "ZombabieStakePool4Contract",
    "ZombabieStakePool5Contract",
];

/// The number of confirmations to wait for each deployment transaction
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

// --- Artifacts --- //

/// The default directory holding Hardhat compilation artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The artifacts subdirectory holding compiler build info, never searched for contracts
pub const BUILD_INFO_DIR: &str = "build-info";

/// The extension of an artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The extension of the debug file sitting next to each artifact
pub const DEBUG_ARTIFACT_EXTENSION: &str = "dbg.json";

// --- Ledger --- //

/// The default path of the address ledger
pub const DEFAULT_LEDGER_PATH: &str = "contract_addresses.md";

/// The markup terminating every ledger entry
pub const LEDGER_LINE_BREAK: &str = "<br/>";

// --- Propagation --- //

/// The default fixed delay before verification, in seconds
pub const DEFAULT_PROPAGATION_DELAY_SECS: u64 = 60;

/// The default interval between explorer index checks, in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// The default upper bound on waiting for the explorer to index deployments, in seconds
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 300;

// --- Explorer API --- //

/// The upper bound on a single explorer API request, in seconds
pub const EXPLORER_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The interval between verification status checks, in seconds
pub const VERIFY_STATUS_POLL_SECS: u64 = 5;

/// The number of verification status checks before giving up
pub const MAX_VERIFY_STATUS_POLLS: usize = 30;

/// The `status` field value of a successful explorer response
pub const EXPLORER_STATUS_OK: &str = "1";

/// Lowercased marker the explorer uses for sources that are already verified
pub const ALREADY_VERIFIED_MARKER: &str = "already verified";

/// Verification status reported while a request is still queued
pub const VERIFY_PENDING_MARKER: &str = "Pending in queue";

/// Verification status reported on success
pub const VERIFY_PASS_MARKER: &str = "Pass - Verified";

/// The code format of a standard JSON input verification request
pub const STANDARD_JSON_CODE_FORMAT: &str = "solidity-standard-json-input";

// --- Networks --- //

/// Cronos testnet RPC URL
pub const CRONOS_TESTNET_RPC_URL: &str = "https://evm-t3.cronos.org/";

/// Cronos testnet chain ID
pub const CRONOS_TESTNET_CHAIN_ID: u64 = 338;

/// Cronos testnet block explorer
pub const CRONOS_TESTNET_EXPLORER_URL: &str = "https://testnet.cronoscan.com";

/// Cronos testnet block explorer API
pub const CRONOS_TESTNET_EXPLORER_API_URL: &str = "https://api-testnet.cronoscan.com/api";

/// Ledger header for Cronos testnet deployments
pub const CRONOS_TESTNET_LEDGER_HEADER: &str =
    "This file contains the latest test deployment addresses in the Cronos Testnet network";

/// Cronos mainnet RPC URL
pub const CRONOS_RPC_URL: &str = "https://evm.cronos.org/";

/// Cronos mainnet chain ID
pub const CRONOS_CHAIN_ID: u64 = 25;

/// Cronos mainnet block explorer
pub const CRONOS_EXPLORER_URL: &str = "https://cronoscan.com";

/// Cronos mainnet block explorer API
pub const CRONOS_EXPLORER_API_URL: &str = "https://api.cronoscan.com/api";

/// Ledger header for Cronos mainnet deployments
pub const CRONOS_LEDGER_HEADER: &str =
    "This file contains the latest deployment addresses in the Cronos network";

/// Legacy gas price used on both Cronos networks, in wei
pub const CRONOS_GAS_PRICE: u128 = 5_000_000_000_000;
