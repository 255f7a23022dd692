//! An in-process ledger backed by Mollusk with the Token-2022 program loaded, for tests and
//! examples that exercise the whole creation flow without a validator.

use std::{
    cell::{
        Cell,
        RefCell,
    },
    collections::{
        HashMap,
        HashSet,
    },
};

use agave_feature_set::{
    account_data_direct_mapping,
    stricter_abi_and_runtime_constraints,
};
use anyhow::{
    anyhow,
    bail,
    Context,
};
use itertools::Itertools;
use mollusk_svm::{
    Mollusk,
    MolluskContext,
};
use solana_account::Account;
use solana_address::Address;
use solana_instruction::{
    AccountMeta,
    Instruction,
};
use solana_sdk::{
    hash::Hash,
    message::Message,
    rent::Rent,
    signature::Signature,
    transaction::Transaction,
};

use crate::ledger::{
    LedgerConnection,
    DEFAULT_FUND_AMOUNT,
};

/// Creates and returns a [`MolluskContext`] with the Token-2022 program loaded and the passed
/// accounts already created.
///
/// Account data is serialized with realloc padding, the way the cluster runs programs today.
/// Under direct account data mapping, Token-2022 reading the bytes it just reallocated without
/// zeroing them fails with `InvalidRealloc`.
pub fn new_launchpad_mollusk_context(
    accounts: Vec<(Address, Account)>,
) -> MolluskContext<HashMap<Address, Account>> {
    let mut mollusk = Mollusk::default();
    mollusk
        .feature_set
        .deactivate(&stricter_abi_and_runtime_constraints::id());
    mollusk
        .feature_set
        .deactivate(&account_data_direct_mapping::id());
    mollusk_svm_programs_token::token2022::add_program(&mut mollusk);

    let context = mollusk.with_context(HashMap::new());
    for (address, account) in accounts {
        context.account_store.borrow_mut().insert(address, account);
    }

    context
}

/// Number of calls made to each [`LedgerConnection`] method.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LedgerCalls {
    pub rent: usize,
    pub blockhash: usize,
    pub send: usize,
}

impl LedgerCalls {
    pub fn total(&self) -> usize {
        self.rent + self.blockhash + self.send
    }
}

/// A [`LedgerConnection`] that executes submitted transactions with Mollusk.
///
/// Only blockhashes it handed out are accepted, and every signature is verified before the
/// instructions run. Queries can be made to fail for error-path tests.
pub struct MolluskLedger {
    context: MolluskContext<HashMap<Address, Account>>,
    rent: Rent,
    calls: Cell<LedgerCalls>,
    issued_blockhashes: RefCell<HashSet<Hash>>,
    fail_rent: Cell<bool>,
    fail_blockhash: Cell<bool>,
}

impl Default for MolluskLedger {
    fn default() -> Self {
        Self::new(vec![])
    }
}

impl MolluskLedger {
    pub fn new(accounts: Vec<(Address, Account)>) -> Self {
        Self {
            context: new_launchpad_mollusk_context(accounts),
            rent: Rent::default(),
            calls: Cell::new(LedgerCalls::default()),
            issued_blockhashes: RefCell::new(HashSet::new()),
            fail_rent: Cell::new(false),
            fail_blockhash: Cell::new(false),
        }
    }

    /// Creates a system-owned account holding [`DEFAULT_FUND_AMOUNT`] lamports.
    pub fn fund(&self, address: &Address) {
        self.context.account_store.borrow_mut().insert(
            *address,
            Account::new(DEFAULT_FUND_AMOUNT, 0, &solana_system_interface::program::ID),
        );
    }

    pub fn account(&self, address: &Address) -> Option<Account> {
        self.context.account_store.borrow().get(address).cloned()
    }

    pub fn calls(&self) -> LedgerCalls {
        self.calls.get()
    }

    pub fn fail_rent_queries(&self, fail: bool) {
        self.fail_rent.set(fail);
    }

    pub fn fail_blockhash_queries(&self, fail: bool) {
        self.fail_blockhash.set(fail);
    }

    fn record(&self, f: impl FnOnce(&mut LedgerCalls)) {
        let mut calls = self.calls.get();
        f(&mut calls);
        self.calls.set(calls);
    }
}

impl LedgerConnection for MolluskLedger {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> anyhow::Result<u64> {
        self.record(|calls| calls.rent += 1);
        if self.fail_rent.get() {
            bail!("Connection refused while fetching rent");
        }
        Ok(self.rent.minimum_balance(data_len))
    }

    async fn latest_blockhash(&self) -> anyhow::Result<Hash> {
        self.record(|calls| calls.blockhash += 1);
        if self.fail_blockhash.get() {
            bail!("Connection refused while fetching blockhash");
        }
        let blockhash = Hash::new_unique();
        self.issued_blockhashes.borrow_mut().insert(blockhash);
        Ok(blockhash)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> anyhow::Result<Signature> {
        self.record(|calls| calls.send += 1);
        if !self
            .issued_blockhashes
            .borrow()
            .contains(&transaction.message.recent_blockhash)
        {
            bail!("Blockhash not found");
        }
        transaction
            .verify()
            .context("Transaction signature verification failed")?;

        let signature = *transaction
            .signatures
            .first()
            .ok_or(anyhow!("Transaction has no signatures"))?;
        let result = self
            .context
            .process_instruction_chain(&decompile(&transaction.message));
        if !result.program_result.is_ok() {
            bail!(
                "Transaction {signature} failed: {:?}",
                result.program_result
            );
        }

        Ok(signature)
    }
}

/// Expands a legacy message's compiled instructions back into [`Instruction`]s.
fn decompile(message: &Message) -> Vec<Instruction> {
    let header = &message.header;
    let num_keys = message.account_keys.len();
    let num_signers = header.num_required_signatures as usize;
    let is_writable = |i: usize| {
        if i < num_signers {
            i < num_signers - header.num_readonly_signed_accounts as usize
        } else {
            i < num_keys - header.num_readonly_unsigned_accounts as usize
        }
    };

    message
        .instructions
        .iter()
        .map(|ix| Instruction {
            program_id: message.account_keys[ix.program_id_index as usize],
            accounts: ix
                .accounts
                .iter()
                .map(|&index| {
                    let i = index as usize;
                    AccountMeta {
                        pubkey: message.account_keys[i],
                        is_signer: i < num_signers,
                        is_writable: is_writable(i),
                    }
                })
                .collect_vec(),
            data: ix.data.clone(),
        })
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use solana_sdk::signature::{
        Keypair,
        Signer,
    };
    use solana_system_interface::instruction::transfer;

    use super::*;
    use crate::{
        layout::{
            AccountLayout,
            ExtensionSet,
        },
        metadata::{
            MintParameters,
            TokenDetails,
            DEFAULT_METADATA_URI,
        },
        mint_identity::MintIdentity,
        token_instructions::{
            create_token_instructions,
            TOKEN_2022_PROGRAM_ID,
        },
    };

    #[test]
    fn token_2022_grows_the_mint_for_its_metadata() {
        let payer = Keypair::new();
        let mint = MintIdentity::generate();
        let mint_address = mint.address();
        let metadata = TokenDetails::new("Token x", "Token x", DEFAULT_METADATA_URI)
            .with_mint(mint_address);
        let layout = AccountLayout::compute(&ExtensionSet::default(), &metadata).unwrap();
        let funded = layout.with_lamports(Rent::default().minimum_balance(layout.total_len()));
        let instructions = create_token_instructions(
            Some(&payer.pubkey()),
            &funded,
            &MintParameters::for_payer(payer.pubkey()),
            &metadata,
        )
        .unwrap();

        let context = new_launchpad_mollusk_context(vec![(
            payer.pubkey(),
            Account::new(DEFAULT_FUND_AMOUNT, 0, &solana_system_interface::program::ID),
        )]);
        let result = context.process_instruction_chain(&instructions);
        assert!(result.program_result.is_ok(), "{:?}", result.program_result);

        let store = context.account_store.borrow();
        let account = store.get(&mint_address).unwrap();
        assert_eq!(account.data.len(), layout.total_len());
        assert_eq!(account.owner, TOKEN_2022_PROGRAM_ID);
    }

    #[test]
    fn decompile_round_trips_account_metas() {
        let payer = Address::new_unique();
        let to = Address::new_unique();
        let ix = transfer(&payer, &to, 5);
        let message = Message::new(&[ix.clone()], Some(&payer));
        assert_eq!(decompile(&message), vec![ix]);
    }

    #[tokio::test]
    async fn counts_calls_and_injects_failures() {
        let ledger = MolluskLedger::default();
        assert_eq!(ledger.calls().total(), 0);

        let small = ledger.minimum_balance_for_rent_exemption(0).await.unwrap();
        let large = ledger.minimum_balance_for_rent_exemption(1_000).await.unwrap();
        assert!(large > small);

        ledger.fail_rent_queries(true);
        assert!(ledger.minimum_balance_for_rent_exemption(0).await.is_err());
        ledger.fail_blockhash_queries(true);
        assert!(ledger.latest_blockhash().await.is_err());

        assert_eq!(
            ledger.calls(),
            LedgerCalls {
                rent: 3,
                blockhash: 1,
                send: 0,
            }
        );
    }

    #[tokio::test]
    async fn executes_signed_transfers() {
        let ledger = MolluskLedger::default();
        let alice = Keypair::new();
        let bob = Address::new_unique();
        ledger.fund(&alice.pubkey());

        let blockhash = ledger.latest_blockhash().await.unwrap();
        let tx = Transaction::new_signed_with_payer(
            &[transfer(&alice.pubkey(), &bob, DEFAULT_FUND_AMOUNT / 2)],
            Some(&alice.pubkey()),
            &[&alice],
            blockhash,
        );
        let signature = ledger.send_transaction(&tx).await.unwrap();
        assert_eq!(signature, tx.signatures[0]);

        let alice_after = ledger.account(&alice.pubkey()).unwrap();
        let bob_after = ledger.account(&bob).unwrap();
        assert_eq!(alice_after.lamports, DEFAULT_FUND_AMOUNT / 2);
        assert_eq!(bob_after.lamports, DEFAULT_FUND_AMOUNT / 2);
    }

    #[tokio::test]
    async fn rejects_unknown_blockhash_and_bad_signatures() {
        let ledger = MolluskLedger::default();
        let alice = Keypair::new();
        ledger.fund(&alice.pubkey());
        let ix = transfer(&alice.pubkey(), &Address::new_unique(), 1);

        let stale = Transaction::new_signed_with_payer(
            &[ix.clone()],
            Some(&alice.pubkey()),
            &[&alice],
            Hash::new_unique(),
        );
        let err = ledger.send_transaction(&stale).await.unwrap_err();
        assert!(err.to_string().contains("Blockhash not found"));

        let blockhash = ledger.latest_blockhash().await.unwrap();
        let mut unsigned = Transaction::new_unsigned(Message::new(&[ix], Some(&alice.pubkey())));
        unsigned.message.recent_blockhash = blockhash;
        assert!(ledger.send_transaction(&unsigned).await.is_err());
        assert_eq!(ledger.account(&alice.pubkey()).unwrap().lamports, DEFAULT_FUND_AMOUNT);
    }
}
