use anyhow::Context;
use launchpad_client::ledger::DEFAULT_RPC_URL;
use solana_sdk::{
    bs58,
    signature::Keypair,
};

pub const RPC_URL_VAR: &str = "RPC_URL";
pub const PAYER_SECRET_KEY_VAR: &str = "PAYER_SECRET_KEY";

pub fn rpc_url() -> String {
    std::env::var(RPC_URL_VAR).unwrap_or_else(|_| DEFAULT_RPC_URL.to_string())
}

/// The payer keypair, or `None` when no wallet is configured.
pub fn payer_keypair() -> anyhow::Result<Option<Keypair>> {
    match std::env::var(PAYER_SECRET_KEY_VAR) {
        Ok(secret) if !secret.trim().is_empty() => parse_keypair(secret.trim()).map(Some),
        _ => Ok(None),
    }
}

/// Accepts either a JSON byte array (the `solana-keygen` file format) or a base58 string.
pub fn parse_keypair(secret: &str) -> anyhow::Result<Keypair> {
    let bytes: Vec<u8> = if secret.starts_with('[') {
        serde_json::from_str(secret).context("Invalid JSON keypair")?
    } else {
        bs58::decode(secret)
            .into_vec()
            .context("Invalid base58 keypair")?
    };

    Keypair::try_from(bytes.as_slice()).context("Invalid keypair bytes")
}
