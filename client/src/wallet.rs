//! The connected-wallet capability: it owns the payer's key, adds the final signature and
//! broadcasts.

use solana_address::Address;
use solana_sdk::{
    signature::{
        Keypair,
        Signature,
        Signer,
    },
    transaction::Transaction,
};

use crate::ledger::LedgerConnection;

#[derive(Debug)]
pub enum WalletError {
    /// The user declined to approve the transaction.
    Rejected,
    /// Signing or broadcasting failed. `signature` is set once the transaction was fully signed.
    Failed {
        signature: Option<Signature>,
        reason: String,
    },
}

#[allow(async_fn_in_trait)]
pub trait WalletSigner {
    /// The payer address; `None` while no wallet is connected.
    fn address(&self) -> Option<Address>;

    /// Asks the user to approve a transaction that the other signers have already signed, and
    /// adds the payer's signature. Nothing has been broadcast when this returns.
    async fn approve(&self, transaction: Transaction) -> Result<Transaction, WalletError>;

    /// Broadcasts a fully signed transaction through `ledger`.
    async fn send<L: LedgerConnection>(
        &self,
        transaction: &Transaction,
        ledger: &L,
    ) -> Result<Signature, WalletError> {
        if !transaction.is_signed() {
            return Err(WalletError::Failed {
                signature: None,
                reason: "transaction is missing required signatures".into(),
            });
        }

        // The first signature is the fee payer's and doubles as the transaction id.
        let signature = transaction.signatures[0];
        ledger
            .send_transaction(transaction)
            .await
            .map_err(|e| WalletError::Failed {
                signature: Some(signature),
                reason: format!("{e:#}"),
            })
    }

    async fn sign_and_send<L: LedgerConnection>(
        &self,
        transaction: Transaction,
        ledger: &L,
    ) -> Result<Signature, WalletError> {
        let transaction = self.approve(transaction).await?;
        self.send(&transaction, ledger).await
    }
}

/// A wallet backed by a local keypair. Approval is implicit.
pub struct KeypairWallet {
    keypair: Option<Keypair>,
}

impl KeypairWallet {
    pub fn connected(keypair: Keypair) -> Self {
        Self {
            keypair: Some(keypair),
        }
    }

    pub fn disconnected() -> Self {
        Self { keypair: None }
    }

    pub fn is_connected(&self) -> bool {
        self.keypair.is_some()
    }
}

impl WalletSigner for KeypairWallet {
    fn address(&self) -> Option<Address> {
        self.keypair.as_ref().map(Keypair::pubkey)
    }

    async fn approve(&self, mut transaction: Transaction) -> Result<Transaction, WalletError> {
        let keypair = self.keypair.as_ref().ok_or_else(|| WalletError::Failed {
            signature: None,
            reason: "wallet is not connected".into(),
        })?;

        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[keypair], blockhash)
            .map_err(|e| WalletError::Failed {
                signature: None,
                reason: e.to_string(),
            })?;

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::{
        hash::Hash,
        message::Message,
    };
    use solana_system_interface::instruction::transfer;

    use super::*;

    struct NoLedger;

    impl LedgerConnection for NoLedger {
        async fn minimum_balance_for_rent_exemption(&self, _: usize) -> anyhow::Result<u64> {
            unreachable!()
        }

        async fn latest_blockhash(&self) -> anyhow::Result<Hash> {
            unreachable!()
        }

        async fn send_transaction(&self, transaction: &Transaction) -> anyhow::Result<Signature> {
            transaction.verify()?;
            Ok(transaction.signatures[0])
        }
    }

    fn two_signer_transaction(payer: &Address, other: &Keypair) -> Transaction {
        let ixs = [
            transfer(payer, &other.pubkey(), 1),
            transfer(&other.pubkey(), payer, 1),
        ];
        let mut tx = Transaction::new_unsigned(Message::new(&ixs, Some(payer)));
        tx.try_partial_sign(&[other], Hash::new_unique()).unwrap();
        tx
    }

    #[tokio::test]
    async fn completes_partially_signed_transaction() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let tx = two_signer_transaction(&payer.pubkey(), &other);
        assert!(!tx.is_signed());

        let wallet = KeypairWallet::connected(payer);
        let signature = wallet.sign_and_send(tx, &NoLedger).await.unwrap();
        assert_ne!(signature, Signature::default());
    }

    #[tokio::test]
    async fn missing_cosigner_fails_before_sending() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let ixs = [transfer(&other.pubkey(), &payer.pubkey(), 1)];
        let tx = Transaction::new_unsigned(Message::new(&ixs, Some(&payer.pubkey())));

        let wallet = KeypairWallet::connected(payer);
        let err = wallet.sign_and_send(tx, &NoLedger).await.unwrap_err();
        assert!(matches!(err, WalletError::Failed { signature: None, .. }));
    }

    #[tokio::test]
    async fn approval_signs_without_sending() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let tx = two_signer_transaction(&payer.pubkey(), &other);

        let wallet = KeypairWallet::connected(payer);
        let approved = wallet.approve(tx).await.unwrap();
        assert!(approved.is_signed());
        approved.verify().unwrap();
    }

    #[tokio::test]
    async fn disconnected_wallet_has_no_address() {
        let wallet = KeypairWallet::disconnected();
        assert!(!wallet.is_connected());
        assert_eq!(wallet.address(), None);

        let other = Keypair::new();
        let tx = two_signer_transaction(&Address::new_unique(), &other);
        assert!(wallet.sign_and_send(tx, &NoLedger).await.is_err());
    }
}
