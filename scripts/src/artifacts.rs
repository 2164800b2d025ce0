//! Loading of Hardhat compilation artifacts.
//!
//! Hardhat writes one `<Contract>.json` artifact per contract under
//! `artifacts/<sourceName>/`, next to a `<Contract>.dbg.json` file pointing at
//! the compiler build info used for source verification.

use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    json_abi::{JsonAbi, Param},
    primitives::Bytes,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    constants::{ARTIFACT_EXTENSION, BUILD_INFO_DIR, DEBUG_ARTIFACT_EXTENSION},
    errors::ScriptError,
};

/// The subset of a Hardhat artifact the scripts read
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    /// The contract name
    contract_name: String,
    /// The path of the source file, relative to the project root
    source_name: String,
    /// The contract ABI
    abi: JsonAbi,
    /// The hex-encoded creation bytecode
    bytecode: String,
}

/// The debug file sitting next to an artifact
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugArtifact {
    /// Path of the build info file, relative to the debug file
    build_info: String,
}

/// The subset of a Hardhat build info file needed for verification
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBuildInfo {
    /// The full compiler version, e.g. `0.8.17+commit.8df45f5f`
    solc_long_version: String,
    /// The standard JSON input the compiler was invoked with
    input: Value,
}

/// Compiler settings and sources a contract was built from
#[derive(Clone, Debug)]
pub struct BuildInfo {
    /// The full compiler version, e.g. `0.8.17+commit.8df45f5f`
    pub solc_long_version: String,
    /// The standard JSON input the compiler was invoked with
    pub input: Value,
}

/// A compiled contract ready to be deployed
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    /// The contract name
    pub contract_name: String,
    /// The path of the source file, relative to the project root
    pub source_name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: Bytes,
    /// Where the artifact was read from
    path: PathBuf,
}

impl ContractArtifact {
    /// The `<sourceName>:<contractName>` identifier explorers expect
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// ABI-encode the constructor arguments, coercing each string to the type
    /// of the matching constructor input
    pub fn encode_constructor_args(&self, args: &[String]) -> Result<Vec<u8>, ScriptError> {
        let inputs: &[Param] = self
            .abi
            .constructor
            .as_ref()
            .map(|c| c.inputs.as_slice())
            .unwrap_or_default();

        if inputs.len() != args.len() {
            return Err(ScriptError::CalldataConstruction(format!(
                "{} takes {} constructor arguments, got {}",
                self.contract_name,
                inputs.len(),
                args.len()
            )));
        }

        let values = inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let ty: DynSolType = param
                    .resolve()
                    .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
                ty.coerce_str(arg).map_err(|e| {
                    ScriptError::CalldataConstruction(format!("argument `{}`: {}", param.name, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DynSolValue::Tuple(values).abi_encode_params())
    }

    /// The payload of a creation transaction: bytecode followed by the encoded
    /// constructor arguments
    pub fn deploy_code(&self, args: &[String]) -> Result<Bytes, ScriptError> {
        let encoded_args = self.encode_constructor_args(args)?;
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encoded_args);
        Ok(code.into())
    }

    /// Read the build info this artifact was compiled from
    pub fn build_info(&self) -> Result<BuildInfo, ScriptError> {
        let dbg_path = self
            .path
            .with_file_name(format!("{}.{}", self.contract_name, DEBUG_ARTIFACT_EXTENSION));
        let dbg: DebugArtifact = read_json(&dbg_path)?;

        let dbg_dir = dbg_path.parent().unwrap_or_else(|| Path::new("."));
        let raw: RawBuildInfo = read_json(&dbg_dir.join(dbg.build_info))?;

        Ok(BuildInfo {
            solc_long_version: raw.solc_long_version,
            input: raw.input,
        })
    }
}

/// A directory of Hardhat artifacts
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The artifacts root directory
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given artifacts directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load the artifact of the named contract
    pub fn load(&self, contract: &str) -> Result<ContractArtifact, ScriptError> {
        let path = self.find(contract)?;
        let raw: RawArtifact = read_json(&path)?;

        let bytecode = Bytes::from_str(&raw.bytecode).map_err(|e| {
            ScriptError::ArtifactParsing(format!("bytecode of {}: {}", contract, e))
        })?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has no creation bytecode, is it abstract?",
                contract
            )));
        }

        Ok(ContractArtifact {
            contract_name: raw.contract_name,
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
            path,
        })
    }

    /// Find the unique artifact file for the named contract
    fn find(&self, contract: &str) -> Result<PathBuf, ScriptError> {
        let file_name = format!("{}.{}", contract, ARTIFACT_EXTENSION);
        let mut matches = Vec::new();
        collect_matching(&self.root, &file_name, &mut matches).map_err(|e| {
            ScriptError::ArtifactParsing(format!("{}: {}", self.root.display(), e))
        })?;

        match matches.len() {
            0 => Err(ScriptError::ArtifactParsing(format!(
                "no artifact for {} under {}",
                contract,
                self.root.display()
            ))),
            1 => Ok(matches.remove(0)),
            n => Err(ScriptError::ArtifactParsing(format!(
                "{} artifacts named {} under {}",
                n,
                contract,
                self.root.display()
            ))),
        }
    }
}

/// Recursively collect files named `file_name`, skipping the build info directory
fn collect_matching(dir: &Path, file_name: &str, matches: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == BUILD_INFO_DIR) {
                continue;
            }
            collect_matching(&path, file_name, matches)?;
        } else if path.file_name().is_some_and(|name| name == file_name) {
            matches.push(path);
        }
    }

    Ok(())
}

/// Read and deserialize a JSON file
fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))
}
