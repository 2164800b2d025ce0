//! The address ledger, a markdown file linking every deployed contract to its
//! page on the block explorer

use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use alloy::primitives::Address;

use crate::{constants::LEDGER_LINE_BREAK, errors::ScriptError, types::DeployedContract};

/// The address ledger of the latest run
#[derive(Clone, Debug)]
pub struct AddressLedger {
    /// Where the ledger lives
    path: PathBuf,
    /// The base URL of the block explorer's web UI
    explorer_url: String,
}

impl AddressLedger {
    /// Create a ledger at `path` linking to pages of the explorer at `explorer_url`
    pub fn new(path: impl Into<PathBuf>, explorer_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            explorer_url: explorer_url.into(),
        }
    }

    /// The ledger's path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The explorer page of `address`
    pub fn address_url(&self, address: Address) -> String {
        format!("{}/address/{}", self.explorer_url.trim_end_matches('/'), address)
    }

    /// The ledger entry of a deployed contract, without the line break
    pub fn format_entry(&self, deployed: &DeployedContract) -> String {
        let url = self.address_url(deployed.address);
        format!("{}: [{url}]({url})", deployed.label)
    }

    /// Replace any previous ledger with `header` followed by one entry per
    /// deployed contract, in order
    pub fn write(&self, header: &str, deployed: &[DeployedContract]) -> Result<(), ScriptError> {
        self.reset()?;
        self.append(header)?;
        for contract in deployed {
            self.append(&self.format_entry(contract))?;
        }

        Ok(())
    }

    /// Remove the ledger left by a previous run, if any
    fn reset(&self) -> Result<(), ScriptError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| self.write_error(e))?;
        }

        Ok(())
    }

    /// Append a single entry to the ledger
    fn append(&self, line: &str) -> Result<(), ScriptError> {
        let mut file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;
        writeln!(file, "{}{}", line, LEDGER_LINE_BREAK).map_err(|e| self.write_error(e))
    }

    /// Wrap an I/O error with the ledger's path
    fn write_error(&self, e: std::io::Error) -> ScriptError {
        ScriptError::WriteLedger(format!("{}: {}", self.path.display(), e))
    }
}
