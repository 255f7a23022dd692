//! Extension-aware sizing for the new mint account and its rent-exempt balance.

use spl_token_2022_interface::{
    extension::ExtensionType,
    state::Mint,
};

use crate::{
    error::CreateTokenError,
    ledger::LedgerConnection,
    metadata::TokenMetadata,
};

/// Largest account data length the runtime accepts.
pub const MAX_PERMITTED_DATA_LENGTH: usize = 10 * 1024 * 1024;

/// Largest number of bytes a single instruction may grow an account by. The metadata write
/// reallocates the mint account by the full metadata TLV length in one instruction.
pub const MAX_PERMITTED_DATA_INCREASE: usize = 10 * 1024;

/// The mint extensions requested for the new account.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtensionSet {
    extensions: Vec<ExtensionType>,
}

impl ExtensionSet {
    /// The only supported set: a metadata pointer that points at the mint itself.
    pub fn metadata_pointer() -> Self {
        Self {
            extensions: vec![ExtensionType::MetadataPointer],
        }
    }

    pub fn try_new(extensions: &[ExtensionType]) -> Result<Self, CreateTokenError> {
        if let Some(unsupported) = extensions
            .iter()
            .find(|ext| **ext != ExtensionType::MetadataPointer)
        {
            return Err(CreateTokenError::UnsupportedExtension(format!(
                "{unsupported:?}"
            )));
        }
        if extensions.is_empty() {
            return Err(CreateTokenError::UnsupportedExtension(
                "an empty extension set; the metadata pointer is required".into(),
            ));
        }

        Ok(Self::metadata_pointer())
    }

    pub fn as_slice(&self) -> &[ExtensionType] {
        &self.extensions
    }

    pub fn contains(&self, extension: ExtensionType) -> bool {
        self.extensions.contains(&extension)
    }

    /// The mint account length with every fixed-size extension in the set, excluding the
    /// variable-length metadata written afterwards.
    pub fn account_len(&self) -> Result<usize, CreateTokenError> {
        Ok(ExtensionType::try_calculate_account_len::<Mint>(
            &self.extensions,
        )?)
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::metadata_pointer()
    }
}

/// Byte lengths for the new mint account.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AccountLayout {
    /// Space allocated by the create account instruction.
    pub account_len: usize,
    /// Space the metadata initialization adds on top of `account_len`.
    pub metadata_len: usize,
}

impl AccountLayout {
    /// Computes the layout locally. Fails with [`CreateTokenError::SizeExceeded`] before anything
    /// touches the network when the metadata can't fit in a single account.
    pub fn compute(
        extensions: &ExtensionSet,
        metadata: &TokenMetadata,
    ) -> Result<Self, CreateTokenError> {
        let account_len = extensions.account_len()?;
        let metadata_len = metadata.tlv_len()?;

        if metadata_len > MAX_PERMITTED_DATA_INCREASE {
            return Err(CreateTokenError::SizeExceeded {
                what: "token metadata",
                len: metadata_len,
                max: MAX_PERMITTED_DATA_INCREASE,
            });
        }

        let layout = Self {
            account_len,
            metadata_len,
        };
        if layout.total_len() > MAX_PERMITTED_DATA_LENGTH {
            return Err(CreateTokenError::SizeExceeded {
                what: "mint account",
                len: layout.total_len(),
                max: MAX_PERMITTED_DATA_LENGTH,
            });
        }

        Ok(layout)
    }

    /// The final account length once the metadata has been written.
    pub fn total_len(&self) -> usize {
        self.account_len + self.metadata_len
    }

    /// Queries the ledger's current rent schedule for the full account length. Never cached.
    pub async fn required_lamports<L: LedgerConnection>(
        &self,
        ledger: &L,
    ) -> Result<u64, CreateTokenError> {
        ledger
            .minimum_balance_for_rent_exemption(self.total_len())
            .await
            .map_err(CreateTokenError::RentQueryFailed)
    }

    pub fn with_lamports(self, required_lamports: u64) -> FundedLayout {
        FundedLayout {
            layout: self,
            required_lamports,
        }
    }
}

/// An [`AccountLayout`] together with the lamports that make its full length rent-exempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FundedLayout {
    pub layout: AccountLayout,
    pub required_lamports: u64,
}

#[cfg(test)]
mod tests {
    use solana_address::Address;
    use solana_sdk::{
        program_pack::Pack,
        rent::Rent,
    };

    use super::*;
    use crate::metadata::{
        TokenDetails,
        DEFAULT_METADATA_URI,
    };

    /// Base mint padded to the token account length, one account type byte, and a metadata
    /// pointer TLV entry (2 + 2 + 32 + 32).
    const MINT_WITH_POINTER_LEN: usize = 165 + 1 + 4 + 64;

    fn metadata(name: &str, symbol: &str, uri: &str) -> TokenMetadata {
        TokenDetails::new(name, symbol, uri).with_mint(Address::new_unique())
    }

    #[test]
    fn account_len_is_mint_plus_pointer() {
        let extensions = ExtensionSet::metadata_pointer();
        assert_eq!(extensions.account_len().unwrap(), MINT_WITH_POINTER_LEN);
        assert!(Mint::LEN < MINT_WITH_POINTER_LEN);
    }

    #[test]
    fn account_len_is_independent_of_metadata() {
        let extensions = ExtensionSet::default();
        let short = AccountLayout::compute(&extensions, &metadata("a", "b", "c")).unwrap();
        let long = AccountLayout::compute(
            &extensions,
            &metadata(&"n".repeat(200), &"s".repeat(20), &"u".repeat(500)),
        )
        .unwrap();

        assert_eq!(short.account_len, MINT_WITH_POINTER_LEN);
        assert_eq!(long.account_len, MINT_WITH_POINTER_LEN);
        assert!(long.metadata_len > short.metadata_len);
    }

    #[test]
    fn token_x_layout() {
        let layout = AccountLayout::compute(
            &ExtensionSet::default(),
            &metadata("Token x", "Token x", DEFAULT_METADATA_URI),
        )
        .unwrap();
        assert_eq!(layout.metadata_len, 136);
        assert_eq!(layout.total_len(), MINT_WITH_POINTER_LEN + 136);
    }

    #[test]
    fn oversized_metadata_is_rejected() {
        let err = AccountLayout::compute(
            &ExtensionSet::default(),
            &metadata("big", "BIG", &"u".repeat(MAX_PERMITTED_DATA_INCREASE)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CreateTokenError::SizeExceeded {
                max: MAX_PERMITTED_DATA_INCREASE,
                ..
            }
        ));
    }

    #[test]
    fn only_the_metadata_pointer_is_supported() {
        assert_eq!(
            ExtensionSet::try_new(&[ExtensionType::MetadataPointer]).unwrap(),
            ExtensionSet::default()
        );
        assert!(matches!(
            ExtensionSet::try_new(&[
                ExtensionType::MetadataPointer,
                ExtensionType::TransferFeeConfig
            ]),
            Err(CreateTokenError::UnsupportedExtension(_))
        ));
        assert!(ExtensionSet::try_new(&[]).is_err());
        assert!(ExtensionSet::default().contains(ExtensionType::MetadataPointer));
    }

    #[test]
    fn rent_is_non_decreasing_in_total_len() {
        let rent = Rent::default();
        let extensions = ExtensionSet::default();
        let mut previous = 0;
        for uri_len in [0, 1, 10, 100, 1_000, 5_000] {
            let layout =
                AccountLayout::compute(&extensions, &metadata("n", "s", &"u".repeat(uri_len)))
                    .unwrap();
            let lamports = rent.minimum_balance(layout.total_len());
            assert!(lamports >= previous);
            previous = lamports;
        }
    }
}
