//! Utilities for the deploy scripts.

use std::str::FromStr;

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use tracing::debug;

use crate::errors::ScriptError;

/// Sets up the provider with which to deploy the contracts, registering a
/// signer for each private key.
///
/// Returns the provider along with the signer addresses, in the order the keys
/// were given. Fails if the RPC endpoint reports a chain other than `chain_id`.
pub async fn setup_client(
    priv_keys: &[String],
    rpc_url: &str,
    chain_id: u64,
) -> Result<(DynProvider, Vec<Address>), ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let signers = priv_keys
        .iter()
        .map(|key| PrivateKeySigner::from_str(key.trim()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let addresses: Vec<Address> = signers.iter().map(|s| s.address()).collect();

    let provider = match signers.split_first() {
        Some((first, rest)) => {
            let mut wallet = EthereumWallet::new(first.clone());
            for signer in rest {
                wallet.register_signer(signer.clone());
            }
            DynProvider::new(ProviderBuilder::new().wallet(wallet).connect_http(url))
        }
        None => DynProvider::new(ProviderBuilder::new().connect_http(url)),
    };

    let remote_chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    if remote_chain_id != chain_id {
        return Err(ScriptError::ClientInitialization(format!(
            "{} serves chain {}, expected {}",
            rpc_url, remote_chain_id, chain_id
        )));
    }
    debug!(chain_id, signers = addresses.len(), "connected to RPC");

    Ok((provider, addresses))
}
