//! The read/broadcast surface the launchpad needs from a Solana cluster.

use anyhow::{
    bail,
    Context,
};
use solana_address::Address;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    hash::Hash,
    signature::Signature,
    transaction::Transaction,
};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8899";

pub const DEFAULT_FUND_AMOUNT: u64 = 10_000_000_000;

const MAX_AIRDROP_POLLS: u8 = 20;

/// A handle to the ledger. The two queries are read-only and safe to retry; only a wallet ever
/// calls [`LedgerConnection::send_transaction`].
#[allow(async_fn_in_trait)]
pub trait LedgerConnection {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> anyhow::Result<u64>;

    /// The replay-protection anchor for a new transaction.
    async fn latest_blockhash(&self) -> anyhow::Result<Hash>;

    async fn send_transaction(&self, transaction: &Transaction) -> anyhow::Result<Signature>;
}

impl LedgerConnection for RpcClient {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> anyhow::Result<u64> {
        self.get_minimum_balance_for_rent_exemption(data_len)
            .await
            .context("Couldn't fetch minimum balance for rent exemption")
    }

    async fn latest_blockhash(&self) -> anyhow::Result<Hash> {
        self.get_latest_blockhash()
            .await
            .context("Couldn't fetch latest blockhash")
    }

    async fn send_transaction(&self, transaction: &Transaction) -> anyhow::Result<Signature> {
        RpcClient::send_transaction(self, transaction)
            .await
            .context("Failed transaction submission")
    }
}

#[derive(Clone, Debug)]
pub struct SendTransactionConfig {
    pub commitment: CommitmentConfig,
    pub debug_logs: Option<bool>,
}

impl Default for SendTransactionConfig {
    fn default() -> Self {
        SendTransactionConfig {
            commitment: CommitmentConfig::confirmed(),
            debug_logs: Some(true),
        }
    }
}

/// An [`RpcClient`] bundled with the config used for launchpad transactions.
pub struct LaunchpadRpcClient {
    pub client: RpcClient,
    pub config: SendTransactionConfig,
}

impl Default for LaunchpadRpcClient {
    fn default() -> Self {
        Self::new_from_url(DEFAULT_RPC_URL, SendTransactionConfig::default())
    }
}

impl LaunchpadRpcClient {
    pub fn new_from_url(url: &str, config: SendTransactionConfig) -> Self {
        LaunchpadRpcClient {
            client: RpcClient::new_with_commitment(url.into(), config.commitment),
            config,
        }
    }

    pub fn debug_logs(&self) -> bool {
        matches!(self.config.debug_logs, Some(true))
    }

    /// Airdrops [`DEFAULT_FUND_AMOUNT`] lamports to `address` and waits for the airdrop to land.
    /// Only works against a local validator or a faucet-enabled cluster.
    pub async fn fund_account(&self, address: &Address) -> anyhow::Result<()> {
        let airdrop_signature: Signature = self
            .client
            .request_airdrop(address, DEFAULT_FUND_AMOUNT)
            .await
            .context("Failed to request airdrop")?;

        for _ in 0..MAX_AIRDROP_POLLS {
            if self
                .client
                .confirm_transaction(&airdrop_signature)
                .await
                .context("Couldn't confirm airdrop")?
            {
                return Ok(());
            }
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }

        bail!("Airdrop did not land.");
    }
}

impl LedgerConnection for LaunchpadRpcClient {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> anyhow::Result<u64> {
        self.client.minimum_balance_for_rent_exemption(data_len).await
    }

    async fn latest_blockhash(&self) -> anyhow::Result<Hash> {
        LedgerConnection::latest_blockhash(&self.client).await
    }

    async fn send_transaction(&self, transaction: &Transaction) -> anyhow::Result<Signature> {
        LedgerConnection::send_transaction(&self.client, transaction).await
    }
}
