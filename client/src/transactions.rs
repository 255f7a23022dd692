//! Coordinates a single token creation attempt: sizing, instruction assembly, the anchor query,
//! local co-signing, and the hand-off to the connected wallet.

use std::{
    fmt,
    future::Future,
};

use colored::Colorize;
use solana_address::Address;
use solana_instruction::Instruction;
use solana_sdk::{
    hash::Hash,
    message::Message,
    signature::{
        Signature,
        Signer,
    },
    transaction::Transaction,
};
use strum_macros::Display;

use crate::{
    error::CreateTokenError,
    fmt_kv,
    layout::{
        AccountLayout,
        ExtensionSet,
    },
    ledger::LedgerConnection,
    logs::fmt_header,
    metadata::{
        MintParameters,
        TokenDetails,
        DEFAULT_DECIMALS,
    },
    mint_identity::MintIdentity,
    print_kv,
    token_instructions::create_token_instructions,
    wallet::{
        WalletError,
        WalletSigner,
    },
    LogColor,
};

/// Maximum serialized size of a transaction.
pub const PACKET_DATA_SIZE: usize = 1280 - 40 - 8;

/// The payer and the new mint.
pub const REQUIRED_SIGNERS: usize = 2;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum CreationState {
    Idle,
    LayoutComputed,
    InstructionsAssembled,
    AnchorFetched,
    LocallySigned,
    SubmittedToWallet,
    Confirmed,
    Rejected,
    WalletCancelled,
}

impl CreationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CreationState::Confirmed | CreationState::Rejected | CreationState::WalletCancelled
        )
    }
}

/// What the display channel receives after the wallet accepted and broadcast the transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CreatedToken {
    pub signature: Signature,
    pub mint_address: Address,
}

impl fmt::Display for CreatedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ signature: {}, mint: {} }}",
            self.signature, self.mint_address
        )
    }
}

/// The result of one attempt along with every state it passed through.
#[derive(Debug)]
pub struct CreationOutcome {
    pub states: Vec<CreationState>,
    pub result: Result<CreatedToken, CreateTokenError>,
}

impl CreationOutcome {
    pub fn final_state(&self) -> CreationState {
        self.states.last().copied().unwrap_or(CreationState::Idle)
    }
}

/// Creates Token-2022 mints with embedded metadata through a [`LedgerConnection`].
///
/// Holds no per-attempt state; every call generates a fresh [`MintIdentity`].
pub struct Launchpad<'a, L> {
    ledger: &'a L,
    extensions: ExtensionSet,
    decimals: u8,
    debug_logs: bool,
}

impl<'a, L: LedgerConnection> Launchpad<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            extensions: ExtensionSet::default(),
            decimals: DEFAULT_DECIMALS,
            debug_logs: false,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_debug_logs(mut self, debug_logs: bool) -> Self {
        self.debug_logs = debug_logs;
        self
    }

    /// Creates the token and waits as long as the wallet takes to approve or decline.
    pub async fn create_token<W: WalletSigner>(
        &self,
        wallet: &W,
        details: TokenDetails,
    ) -> Result<CreatedToken, CreateTokenError> {
        self.create_token_with_cancel(wallet, details, std::future::pending())
            .await
            .result
    }

    /// Creates the token. If `cancel` resolves while the wallet is still deciding, the attempt
    /// ends as [`CreationState::WalletCancelled`]. A cancel after approval has no effect.
    pub async fn create_token_with_cancel<W: WalletSigner>(
        &self,
        wallet: &W,
        details: TokenDetails,
        cancel: impl Future<Output = ()>,
    ) -> CreationOutcome {
        let mut states = vec![];
        let result = self.run(&mut states, wallet, details, cancel).await;

        if self.debug_logs {
            match &result {
                Ok(created) => {
                    print_kv!("Signature", created.signature, LogColor::Header);
                    print_kv!("Mint", created.mint_address, LogColor::Header);
                }
                Err(e) => crate::logs::print_failure(&e.report()),
            }
        }

        CreationOutcome { states, result }
    }

    async fn run<W: WalletSigner>(
        &self,
        states: &mut Vec<CreationState>,
        wallet: &W,
        details: TokenDetails,
        cancel: impl Future<Output = ()>,
    ) -> Result<CreatedToken, CreateTokenError> {
        self.transition(states, CreationState::Idle);
        let payer = wallet.address().ok_or(CreateTokenError::MissingSigner)?;

        let mint = MintIdentity::generate();
        let mint_address = mint.address();
        let metadata = details.with_mint(mint_address);
        let params = MintParameters {
            decimals: self.decimals,
            ..MintParameters::for_payer(payer)
        };

        let layout = AccountLayout::compute(&self.extensions, &metadata)?;
        // Lamports are a fixed-width field, so a draft funded with zero lamports has the final
        // transaction size and the packet limit can be checked before touching the ledger.
        unsigned_transaction(
            &payer,
            &create_token_instructions(Some(&payer), &layout.with_lamports(0), &params, &metadata)?,
        )?;
        self.transition(states, CreationState::LayoutComputed);
        if self.debug_logs {
            println!("{}", fmt_header("create token"));
            print_kv!("Payer", payer);
            print_kv!("Mint", mint_address);
            print_kv!("Account length", layout.account_len);
            print_kv!("Metadata length", layout.metadata_len);
        }

        // The rent and anchor queries don't depend on each other.
        let (lamports, blockhash) = futures::try_join!(
            layout.required_lamports(self.ledger),
            self.latest_blockhash(),
        )?;
        if self.debug_logs {
            print_kv!("Rent-exempt lamports", lamports);
            print_kv!("Blockhash", blockhash);
        }

        let instructions = create_token_instructions(
            Some(&payer),
            &layout.with_lamports(lamports),
            &params,
            &metadata,
        )?;
        let mut transaction = unsigned_transaction(&payer, &instructions)?;
        self.transition(states, CreationState::InstructionsAssembled);

        transaction.message.recent_blockhash = blockhash;
        self.transition(states, CreationState::AnchorFetched);

        sign_with_mint(&mut transaction, mint)?;
        self.transition(states, CreationState::LocallySigned);

        self.transition(states, CreationState::SubmittedToWallet);
        // Only approval can be cancelled. Once the wallet has signed, the broadcast runs to
        // completion and its failures are submission failures.
        let approved = tokio::select! {
            biased;
            res = wallet.approve(transaction) => res,
            _ = cancel => Err(WalletError::Rejected),
        };
        let submitted = match approved {
            Ok(transaction) => wallet.send(&transaction, self.ledger).await,
            Err(e) => Err(e),
        };

        match submitted {
            Ok(signature) => {
                self.transition(states, CreationState::Confirmed);
                Ok(CreatedToken {
                    signature,
                    mint_address,
                })
            }
            Err(WalletError::Rejected) => {
                self.transition(states, CreationState::WalletCancelled);
                Err(CreateTokenError::WalletCancelled)
            }
            Err(WalletError::Failed { signature, reason }) => {
                self.transition(states, CreationState::Rejected);
                Err(CreateTokenError::SubmissionFailed { signature, reason })
            }
        }
    }

    async fn latest_blockhash(&self) -> Result<Hash, CreateTokenError> {
        self.ledger
            .latest_blockhash()
            .await
            .map_err(CreateTokenError::AnchorFetchFailed)
    }

    fn transition(&self, states: &mut Vec<CreationState>, next: CreationState) {
        if self.debug_logs {
            let color = if next.is_terminal() {
                LogColor::Highlight
            } else {
                LogColor::Gray
            };
            println!("{}", fmt_kv!("State", next, LogColor::Info, color));
        }
        states.push(next);
    }
}

/// Wraps the instructions in a transaction paid for by `payer`. Fails with
/// [`CreateTokenError::SizeExceeded`] if the signed transaction can't fit in a packet.
pub fn unsigned_transaction(
    payer: &Address,
    instructions: &[Instruction],
) -> Result<Transaction, CreateTokenError> {
    let message = Message::new(instructions, Some(payer));
    let num_signatures = message.header.num_required_signatures as usize;
    // A short-vec length prefix under 128 is a single byte.
    let len = 1 + num_signatures * 64 + message.serialize().len();
    if len > PACKET_DATA_SIZE {
        return Err(CreateTokenError::SizeExceeded {
            what: "transaction",
            len,
            max: PACKET_DATA_SIZE,
        });
    }

    Ok(Transaction::new_unsigned(message))
}

/// Signs with the mint identity using the transaction's current blockhash. The payer's signature
/// slot is left empty for the wallet.
pub fn sign_with_mint(
    transaction: &mut Transaction,
    mint: MintIdentity,
) -> Result<(), CreateTokenError> {
    let mint = mint.into_keypair();
    let signers = &transaction.message.account_keys
        [..transaction.message.header.num_required_signatures as usize];
    if signers.len() != REQUIRED_SIGNERS || signers[1] != mint.pubkey() {
        return Err(CreateTokenError::SigningFailed(format!(
            "expected the payer and mint {} as the only signers, found {signers:?}",
            mint.pubkey()
        )));
    }

    let blockhash = transaction.message.recent_blockhash;
    transaction
        .try_partial_sign(&[&mint], blockhash)
        .map_err(|e| CreateTokenError::SigningFailed(e.to_string()))
}
