use solana_address::Address;
use solana_sdk::signature::{
    Keypair,
    Signer,
};

/// The freshly generated keypair for a single creation attempt.
///
/// Its address is both the mint account and the metadata account. Not `Clone`: the identity
/// signs exactly once via [`MintIdentity::into_keypair`] and is dropped with the transaction.
pub struct MintIdentity {
    keypair: Keypair,
}

impl MintIdentity {
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.keypair.pubkey()
    }

    /// Gives up the identity for signing.
    pub(crate) fn into_keypair(self) -> Keypair {
        self.keypair
    }
}

impl From<Keypair> for MintIdentity {
    fn from(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_identities_are_distinct() {
        let a = MintIdentity::generate();
        let b = MintIdentity::generate();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn address_matches_keypair() {
        let keypair = Keypair::new();
        let expected = keypair.pubkey();
        let identity = MintIdentity::from(keypair);
        assert_eq!(identity.address(), expected);
        assert_eq!(identity.into_keypair().pubkey(), expected);
    }
}
