//! Creates a Token-2022 mint with embedded metadata in a single transaction, paid for by the
//! keypair in `PAYER_SECRET_KEY`.

use std::future::Future;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use launchpad_client::{
    ledger::{
        LaunchpadRpcClient,
        SendTransactionConfig,
    },
    logs::print_failure,
    print_kv,
    wallet::KeypairWallet,
    Launchpad,
    LogColor,
};

use crate::cli::CliArgs;

pub mod cli;
pub mod load_env;

/// Resolves when `signal` fires. If the signal handler can't be installed the attempt simply
/// can't be cancelled, so this never resolves.
async fn cancel_on(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        print_kv!("Ctrl-C unavailable", e, LogColor::Warning);
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let (details, initial_supply) = args
        .parse_form()
        .inspect_err(|e| print_failure(&e.report()))?;

    let rpc_url = args.rpc_url.clone().unwrap_or_else(load_env::rpc_url);
    let rpc = LaunchpadRpcClient::new_from_url(
        &rpc_url,
        SendTransactionConfig {
            debug_logs: Some(args.debug_logs),
            ..Default::default()
        },
    );

    // Without a configured payer the wallet stays disconnected and the attempt fails with
    // `MissingSigner` before any RPC call.
    let wallet = match load_env::payer_keypair()? {
        Some(keypair) => KeypairWallet::connected(keypair),
        None => KeypairWallet::disconnected(),
    };

    let launchpad = Launchpad::new(&rpc)
        .with_decimals(args.decimals)
        .with_debug_logs(rpc.debug_logs());

    // Ctrl-C while the transaction is waiting for approval cancels the attempt.
    let cancel = cancel_on(tokio::signal::ctrl_c());
    let outcome = launchpad
        .create_token_with_cancel(&wallet, details, cancel)
        .await;
    let final_state = outcome.final_state();

    match outcome.result {
        Ok(created) => {
            if !rpc.debug_logs() {
                print_kv!("Signature", created.signature, LogColor::Header);
                print_kv!("Mint", created.mint_address, LogColor::Header);
            }
            if let Some(supply) = initial_supply {
                print_kv!("Initial supply (not minted)", supply, LogColor::Warning);
            }
            Ok(())
        }
        Err(e) => {
            if !rpc.debug_logs() {
                print_failure(&e.report());
            }
            Err(e).context(format!("Token creation ended in {final_state}"))
        }
    }
}
