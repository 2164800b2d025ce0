//! Mock collaborators for the pipeline tests.
//!
//! Every mock records its calls into a shared [`EventLog`] so tests can assert
//! on the global order of operations.

use std::{
    collections::{HashMap, VecDeque},
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use alloy::primitives::Address;
use itertools::Itertools;
use serde_json::json;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use crate::{
    errors::ScriptError,
    interfaces::{ChainBackend, ContractFactory, IndexProbe, PropagationWait, SourceVerifier},
    types::{DeployedContract, VerificationOutcome},
};

/// A unique path under the system temp dir
pub fn temp_path(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{:016x}", prefix, rand::random::<u64>()))
}

/// The constructor-bearing ABI used by the test artifacts
fn stake_abi() -> serde_json::Value {
    json!([
        {
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": [{ "name": "_nftAddress", "type": "address", "internalType": "address" }]
        },
        {
            "type": "function",
            "name": "stake",
            "stateMutability": "nonpayable",
            "inputs": [{ "name": "tokenIds", "type": "uint256[]", "internalType": "uint256[]" }],
            "outputs": []
        }
    ])
}

/// Write a Hardhat-style artifacts tree for `ZombabieStake` under `root`
pub fn write_stake_artifacts(root: &Path) {
    let contract_dir = root.join("contracts").join("ZombabieStake.sol");
    let build_info_dir = root.join("build-info");
    fs::create_dir_all(&contract_dir).unwrap();
    fs::create_dir_all(&build_info_dir).unwrap();

    let artifact = json!({
        "_format": "hh-sol-artifact-1",
        "contractName": "ZombabieStake",
        "sourceName": "contracts/ZombabieStake.sol",
        "abi": stake_abi(),
        "bytecode": "0x6080604052",
        "deployedBytecode": "0x6080",
        "linkReferences": {},
        "deployedLinkReferences": {}
    });
    let dbg = json!({
        "_format": "hh-sol-dbg-1",
        "buildInfo": "../../build-info/abc123.json"
    });
    let build_info = json!({
        "_format": "hh-sol-build-info-1",
        "solcVersion": "0.8.17",
        "solcLongVersion": "0.8.17+commit.8df45f5f",
        "input": { "language": "Solidity", "sources": {}, "settings": {} }
    });

    fs::write(contract_dir.join("ZombabieStake.json"), artifact.to_string()).unwrap();
    fs::write(contract_dir.join("ZombabieStake.dbg.json"), dbg.to_string()).unwrap();
    fs::write(build_info_dir.join("abc123.json"), build_info.to_string()).unwrap();
}

/// A shared, ordered record of collaborator calls
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    /// Record an event
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    /// All events recorded so far
    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// The events starting with `prefix`
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }
}

/// A chain backend handing out scripted deployment results
pub struct MockBackend {
    /// The shared event log
    log: EventLog,
    /// The signers returned by `signers`
    signers: Vec<Address>,
    /// Scripted deployment results, consumed in order
    results: Arc<Mutex<VecDeque<Result<Address, ScriptError>>>>,
    /// Contracts whose factory lookup fails
    missing: Vec<String>,
}

impl MockBackend {
    /// A backend with one signer whose deployments return `addresses` in order
    pub fn new(log: &EventLog, addresses: &[Address]) -> Self {
        Self::scripted(log, addresses.iter().copied().map(Ok).collect())
    }

    /// A backend with one signer whose deployments return the scripted results
    pub fn scripted(log: &EventLog, results: Vec<Result<Address, ScriptError>>) -> Self {
        Self {
            log: log.clone(),
            signers: vec![Address::repeat_byte(0xde)],
            results: Arc::new(Mutex::new(results.into())),
            missing: Vec::new(),
        }
    }

    /// Replace the signing accounts
    pub fn with_signers(mut self, signers: Vec<Address>) -> Self {
        self.signers = signers;
        self
    }

    /// Make the factory lookup for `contract` fail
    pub fn without_contract(mut self, contract: &str) -> Self {
        self.missing.push(contract.to_string());
        self
    }
}

impl ChainBackend for MockBackend {
    type Factory = MockFactory;

    async fn signers(&self) -> Result<Vec<Address>, ScriptError> {
        self.log.push("signers");
        Ok(self.signers.clone())
    }

    async fn contract_factory(&self, contract: &str) -> Result<MockFactory, ScriptError> {
        self.log.push(format!("factory {}", contract));
        if self.missing.iter().any(|c| c == contract) {
            return Err(ScriptError::ArtifactParsing(format!("no artifact for {}", contract)));
        }

        Ok(MockFactory {
            log: self.log.clone(),
            contract: contract.to_string(),
            results: self.results.clone(),
        })
    }
}

/// A factory popping its result off the backend's script
pub struct MockFactory {
    /// The shared event log
    log: EventLog,
    /// The contract this factory deploys
    contract: String,
    /// The backend's scripted results
    results: Arc<Mutex<VecDeque<Result<Address, ScriptError>>>>,
}

impl ContractFactory for MockFactory {
    async fn deploy(
        &self,
        signer: Address,
        constructor_args: &[String],
    ) -> Result<Address, ScriptError> {
        let args = constructor_args.iter().join(",");
        self.log
            .push(format!("submit {} [{}] from {:#x}", self.contract, args, signer));

        // Give any concurrently issued deployment a chance to interleave
        tokio::task::yield_now().await;

        let result = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ScriptError::ContractDeployment("no scripted result".into())));
        if let Ok(address) = &result {
            self.log.push(format!("confirm {} {:#x}", self.contract, address));
        }
        result
    }
}

/// A verifier with per-address scripted outcomes, `Verified` by default
#[derive(Default)]
pub struct MockVerifier {
    /// The shared event log
    log: EventLog,
    /// Scripted outcomes by address
    outcomes: HashMap<Address, Result<VerificationOutcome, ScriptError>>,
}

impl MockVerifier {
    /// A verifier that verifies everything
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            outcomes: HashMap::new(),
        }
    }

    /// Script the outcome for `address`
    pub fn with_outcome(
        mut self,
        address: Address,
        outcome: Result<VerificationOutcome, ScriptError>,
    ) -> Self {
        self.outcomes.insert(address, outcome);
        self
    }
}

impl SourceVerifier for MockVerifier {
    async fn verify(
        &self,
        deployed: &DeployedContract,
    ) -> Result<VerificationOutcome, ScriptError> {
        let args = deployed.constructor_args.iter().join(",");
        self.log
            .push(format!("verify {:#x} [{}]", deployed.address, args));
        self.outcomes
            .get(&deployed.address)
            .cloned()
            .unwrap_or(Ok(VerificationOutcome::Verified))
    }
}

/// A propagation wait that returns immediately
pub struct MockWait {
    /// The shared event log
    log: EventLog,
}

impl MockWait {
    /// Create a new mock wait
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl PropagationWait for MockWait {
    async fn wait(&self, deployed: &[DeployedContract]) -> Result<(), ScriptError> {
        self.log.push(format!("wait {}", deployed.len()));
        Ok(())
    }
}

/// An index probe reporting each address as indexed after a number of checks
#[derive(Default)]
pub struct MockProbe {
    /// Remaining negative answers by address; absent addresses are never indexed
    remaining: Mutex<HashMap<Address, usize>>,
    /// Number of probe calls made
    calls: Mutex<usize>,
}

impl MockProbe {
    /// Report `address` as indexed after `misses` negative answers
    pub fn indexed_after(self, address: Address, misses: usize) -> Self {
        self.remaining.lock().unwrap().insert(address, misses);
        self
    }

    /// Number of probe calls made so far
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl IndexProbe for MockProbe {
    async fn is_indexed(&self, address: Address) -> Result<bool, ScriptError> {
        *self.calls.lock().unwrap() += 1;
        let mut remaining = self.remaining.lock().unwrap();
        match remaining.get_mut(&address) {
            Some(0) => Ok(true),
            Some(misses) => {
                *misses -= 1;
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

impl IndexProbe for &MockProbe {
    async fn is_indexed(&self, address: Address) -> Result<bool, ScriptError> {
        (**self).is_indexed(address).await
    }
}

/// The body served once a stub explorer runs out of scripted responses
const UNSCRIPTED_RESPONSE: &str = r#"{"status":"0","message":"NOTOK","result":"unscripted request"}"#;

/// A local HTTP server answering explorer API requests with canned JSON bodies,
/// one per request, in order
pub struct StubExplorer {
    /// The API URL to point a client at
    url: String,
    /// The raw requests received so far
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubExplorer {
    /// Start serving `responses` on an ephemeral port
    pub async fn serve(responses: &[&str]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let mut queue: VecDeque<String> = responses.iter().map(|r| r.to_string()).collect();
        let received = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let request = read_request(&mut stream).await;
                received.lock().unwrap().push(request);

                let body = queue
                    .pop_front()
                    .unwrap_or_else(|| UNSCRIPTED_RESPONSE.to_string());
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { url, requests }
    }

    /// Start a server that accepts connections but never answers
    pub async fn stalled() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        url
    }

    /// The API URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The raw requests received so far, headers and body included
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Read one HTTP request, headers and body
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|len| len.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            break;
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}
