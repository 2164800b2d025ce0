//! Scripts for deploying and verifying the Zombabie staking pools.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod chain;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod errors;
pub mod explorer;
pub mod interfaces;
pub mod ledger;
#[cfg(test)]
mod mocks;
pub mod types;
pub mod utils;
pub mod wait;
