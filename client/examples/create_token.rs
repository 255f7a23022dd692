//! Creates a "Token x" mint on a local validator with a freshly airdropped payer.
//!
//! Run `solana-test-validator` first.

use colored::Colorize;
use launchpad_client::{
    ledger::LaunchpadRpcClient,
    metadata::{
        TokenDetails,
        DEFAULT_METADATA_URI,
    },
    print_kv,
    wallet::KeypairWallet,
    Launchpad,
    LogColor,
};
use solana_sdk::signature::{
    Keypair,
    Signer,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let rpc = LaunchpadRpcClient::default();
    let payer = Keypair::new();
    rpc.fund_account(&payer.pubkey()).await?;

    let wallet = KeypairWallet::connected(payer);
    let created = Launchpad::new(&rpc)
        .with_debug_logs(rpc.debug_logs())
        .create_token(
            &wallet,
            TokenDetails::new("Token x", "Token x", DEFAULT_METADATA_URI),
        )
        .await?;

    print_kv!("Created", created, LogColor::Highlight);

    Ok(())
}
