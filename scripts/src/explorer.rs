//! A client for Etherscan-compatible block explorer APIs, used to verify
//! contract sources and to check whether deployments have been indexed

use std::time::Duration;

use alloy::{primitives::Address, transports::http::reqwest::Client};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::{
    artifacts::ArtifactStore,
    constants::{
        ALREADY_VERIFIED_MARKER, EXPLORER_STATUS_OK, MAX_VERIFY_STATUS_POLLS,
        STANDARD_JSON_CODE_FORMAT, VERIFY_PASS_MARKER, VERIFY_PENDING_MARKER,
        VERIFY_STATUS_POLL_SECS,
    },
    errors::ScriptError,
    interfaces::{IndexProbe, SourceVerifier},
    types::{DeployedContract, VerificationOutcome},
};

/// The envelope of every explorer API response
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    /// `"1"` on success, `"0"` otherwise
    status: String,
    /// A short status message
    #[serde(default)]
    message: String,
    /// The payload, or an error description
    #[serde(default)]
    result: Value,
}

impl ExplorerResponse {
    /// Whether the explorer reported success
    fn is_ok(&self) -> bool {
        self.status == EXPLORER_STATUS_OK
    }

    /// The result rendered as text
    fn result_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the result says the source is already verified
    fn says_already_verified(&self) -> bool {
        self.result_text()
            .to_lowercase()
            .contains(ALREADY_VERIFIED_MARKER)
    }
}

/// The explorer's answer to a verification submission
#[derive(Debug, PartialEq, Eq)]
enum Submission {
    /// The request was queued under the given GUID
    Queued(String),
    /// The explorer already has the source
    AlreadyVerified,
}

/// An Etherscan-compatible explorer API client
#[derive(Clone, Debug)]
pub struct ExplorerClient {
    /// The HTTP client
    http: Client,
    /// The API endpoint
    api_url: String,
    /// The API key
    api_key: String,
    /// Where the sources and compiler settings are read from
    artifacts: ArtifactStore,
    /// The pause between verification status checks
    status_poll_interval: Duration,
    /// The number of status checks before giving up
    max_status_polls: usize,
}

impl ExplorerClient {
    /// Create a client for the explorer API at `api_url`, giving up on any
    /// single request after `request_timeout`
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        artifacts: ArtifactStore,
        request_timeout: Duration,
    ) -> Result<Self, ScriptError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
            artifacts,
            status_poll_interval: Duration::from_secs(VERIFY_STATUS_POLL_SECS),
            max_status_polls: MAX_VERIFY_STATUS_POLLS,
        })
    }

    /// Override how verification status is polled
    pub fn with_status_polling(mut self, interval: Duration, max_polls: usize) -> Self {
        self.status_poll_interval = interval;
        self.max_status_polls = max_polls;
        self
    }

    /// Whether the explorer already shows verified source for `address`
    pub async fn is_verified(&self, address: Address) -> Result<bool, ScriptError> {
        let address = format!("{address:#x}");
        let resp = self
            .get(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address.as_str()),
            ])
            .await?;

        Ok(has_source_code(&resp))
    }

    /// Submit the source of a deployed contract for verification
    async fn submit(&self, deployed: &DeployedContract) -> Result<Submission, ScriptError> {
        let artifact = self.artifacts.load(&deployed.contract)?;
        let build_info = artifact.build_info()?;

        let source_code = serde_json::to_string(&build_info.input)
            .map_err(|e| ScriptError::Verification(e.to_string()))?;
        let constructor_args =
            hex::encode(artifact.encode_constructor_args(&deployed.constructor_args)?);
        let address = format!("{:#x}", deployed.address);
        let contract_name = artifact.fully_qualified_name();
        let compiler_version = format!("v{}", build_info.solc_long_version);

        let resp = self
            .post(&[
                ("module", "contract"),
                ("action", "verifysourcecode"),
                ("contractaddress", address.as_str()),
                ("sourceCode", source_code.as_str()),
                ("codeformat", STANDARD_JSON_CODE_FORMAT),
                ("contractname", contract_name.as_str()),
                ("compilerversion", compiler_version.as_str()),
                // Sic, the explorer API misspells this parameter
                ("constructorArguements", constructor_args.as_str()),
            ])
            .await?;

        classify_submission(&resp)
    }

    /// Poll the status of a queued verification until the explorer decides
    async fn await_status(&self, guid: &str) -> Result<VerificationOutcome, ScriptError> {
        for _ in 0..self.max_status_polls {
            sleep(self.status_poll_interval).await;

            let resp = self
                .get(&[
                    ("module", "contract"),
                    ("action", "checkverifystatus"),
                    ("guid", guid),
                ])
                .await?;
            match classify_status(&resp)? {
                Some(outcome) => return Ok(outcome),
                None => debug!(guid, "verification pending"),
            }
        }

        Err(ScriptError::Verification(format!(
            "verification {} still pending after {} status checks",
            guid, self.max_status_polls
        )))
    }

    /// Issue a GET request against the API
    async fn get(&self, params: &[(&str, &str)]) -> Result<ExplorerResponse, ScriptError> {
        let body = self
            .http
            .get(&self.api_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ScriptError::ExplorerRequest(e.to_string()))?
            .text()
            .await
            .map_err(|e| ScriptError::ExplorerRequest(e.to_string()))?;

        parse_response(&body)
    }

    /// Issue a form-encoded POST request against the API
    async fn post(&self, params: &[(&str, &str)]) -> Result<ExplorerResponse, ScriptError> {
        let mut form = params.to_vec();
        form.push(("apikey", self.api_key.as_str()));

        let body = self
            .http
            .post(&self.api_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ScriptError::ExplorerRequest(e.to_string()))?
            .text()
            .await
            .map_err(|e| ScriptError::ExplorerRequest(e.to_string()))?;

        parse_response(&body)
    }
}

impl SourceVerifier for ExplorerClient {
    async fn verify(
        &self,
        deployed: &DeployedContract,
    ) -> Result<VerificationOutcome, ScriptError> {
        if self.is_verified(deployed.address).await? {
            return Ok(VerificationOutcome::AlreadyVerified);
        }

        match self.submit(deployed).await? {
            Submission::AlreadyVerified => Ok(VerificationOutcome::AlreadyVerified),
            Submission::Queued(guid) => {
                info!(label = %deployed.label, guid = %guid, "Verification request queued");
                self.await_status(&guid).await
            }
        }
    }
}

impl IndexProbe for ExplorerClient {
    async fn is_indexed(&self, address: Address) -> Result<bool, ScriptError> {
        let address = format!("{address:#x}");
        let resp = self
            .get(&[
                ("module", "contract"),
                ("action", "getcontractcreation"),
                ("contractaddresses", address.as_str()),
            ])
            .await?;

        Ok(is_creation_indexed(&resp))
    }
}

// -----------
// | Helpers |
// -----------

/// Parse a raw response body
fn parse_response(body: &str) -> Result<ExplorerResponse, ScriptError> {
    serde_json::from_str(body).map_err(|e| {
        ScriptError::ExplorerRequest(format!("unexpected response `{}`: {}", body, e))
    })
}

/// Whether a `getsourcecode` response carries verified source
fn has_source_code(resp: &ExplorerResponse) -> bool {
    resp.is_ok()
        && resp
            .result
            .as_array()
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.get("SourceCode"))
            .and_then(Value::as_str)
            .is_some_and(|source| !source.is_empty())
}

/// Whether a `getcontractcreation` response found the contract
fn is_creation_indexed(resp: &ExplorerResponse) -> bool {
    resp.is_ok()
        && resp
            .result
            .as_array()
            .is_some_and(|entries| !entries.is_empty())
}

/// Classify the response to a `verifysourcecode` submission
fn classify_submission(resp: &ExplorerResponse) -> Result<Submission, ScriptError> {
    if resp.is_ok() {
        return Ok(Submission::Queued(resp.result_text()));
    }
    if resp.says_already_verified() {
        return Ok(Submission::AlreadyVerified);
    }

    Err(ScriptError::Verification(format!(
        "submission rejected: {} ({})",
        resp.result_text(),
        resp.message
    )))
}

/// Classify the response to a `checkverifystatus` request, `None` while pending
fn classify_status(resp: &ExplorerResponse) -> Result<Option<VerificationOutcome>, ScriptError> {
    let result = resp.result_text();
    if result == VERIFY_PENDING_MARKER {
        return Ok(None);
    }
    if result == VERIFY_PASS_MARKER {
        return Ok(Some(VerificationOutcome::Verified));
    }
    if resp.says_already_verified() {
        return Ok(Some(VerificationOutcome::AlreadyVerified));
    }

    Err(ScriptError::Verification(result))
}
