//! The user-facing token description and the mint parameters derived from it.

use solana_address::Address;
use solana_program_error::ProgramError;
use spl_token_metadata_interface::state::TokenMetadata as TokenMetadataState;

use crate::error::CreateTokenError;

pub const DEFAULT_DECIMALS: u8 = 9;
pub const DEFAULT_METADATA_URI: &str = "https://cdn.100xdevs.com/metadata.json";

/// Token-2022 extension entries are prefixed by a `u16` type and a `u16` length.
const EXTENSION_HEADER_LEN: usize = 2 + 2;

/// Name, symbol, URI and extra key/value pairs for a token that doesn't have a mint yet.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenDetails {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub additional_metadata: Vec<(String, String)>,
}

impl TokenDetails {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            uri: uri.into(),
            additional_metadata: vec![],
        }
    }

    /// Adds a key/value pair, replacing the value if the key is already present.
    pub fn with_additional(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        match self.additional_metadata.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.additional_metadata.push((key, value)),
        }
        self
    }

    /// Binds the details to the mint address of the current attempt.
    pub fn with_mint(self, mint: Address) -> TokenMetadata {
        TokenMetadata {
            mint,
            details: self,
        }
    }
}

/// Immutable metadata for one mint. The mint account doubles as the metadata account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenMetadata {
    mint: Address,
    details: TokenDetails,
}

impl TokenMetadata {
    pub fn mint(&self) -> &Address {
        &self.mint
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn symbol(&self) -> &str {
        &self.details.symbol
    }

    pub fn uri(&self) -> &str {
        &self.details.uri
    }

    pub fn additional_metadata(&self) -> &[(String, String)] {
        &self.details.additional_metadata
    }

    /// The on-chain representation written by the token metadata interface.
    pub fn to_state(
        &self,
        update_authority: Option<Address>,
    ) -> Result<TokenMetadataState, ProgramError> {
        Ok(TokenMetadataState {
            update_authority: update_authority.try_into()?,
            mint: self.mint,
            name: self.details.name.clone(),
            symbol: self.details.symbol.clone(),
            uri: self.details.uri.clone(),
            additional_metadata: self.details.additional_metadata.clone(),
        })
    }

    /// Size of the metadata entry inside the mint: the 2-byte extension type and 2-byte length
    /// prefixes plus the borsh-encoded metadata. The update authority is a fixed 32 bytes whether
    /// set or not.
    pub fn tlv_len(&self) -> Result<usize, ProgramError> {
        let packed_len = borsh::object_length(&self.to_state(None)?)
            .map_err(|_| ProgramError::InvalidAccountData)?;
        packed_len
            .checked_add(EXTENSION_HEADER_LEN)
            .ok_or(ProgramError::ArithmeticOverflow)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MintParameters {
    pub decimals: u8,
    pub mint_authority: Address,
    pub freeze_authority: Option<Address>,
}

impl MintParameters {
    /// Default mint parameters: 9 decimals, the payer as mint authority and no freeze authority.
    pub fn for_payer(payer: Address) -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            mint_authority: payer,
            freeze_authority: None,
        }
    }
}

/// The raw text fields collected from the user.
#[derive(Clone, Debug, Default)]
pub struct TokenForm {
    pub name: String,
    pub symbol: String,
    pub image_url: Option<String>,
    pub initial_supply: Option<String>,
}

impl TokenForm {
    /// Validates the form into [`TokenDetails`]. A non-empty image URL becomes the metadata URI;
    /// otherwise the default metadata URI is used.
    pub fn to_details(&self) -> Result<TokenDetails, CreateTokenError> {
        let name = required("name", &self.name)?;
        let symbol = required("symbol", &self.symbol)?;
        let uri = match self.image_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_METADATA_URI,
        };

        Ok(TokenDetails::new(name, symbol, uri))
    }

    /// Parses the optional initial supply. The supply is informational only; no tokens are
    /// minted by the creation transaction.
    pub fn initial_supply(&self) -> Result<Option<u64>, CreateTokenError> {
        match self.initial_supply.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(supply) => {
                supply
                    .replace('_', "")
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|e| CreateTokenError::InvalidField {
                        field: "initial supply",
                        reason: e.to_string(),
                    })
            }
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, CreateTokenError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CreateTokenError::InvalidField {
            field,
            reason: "must not be empty".into(),
        });
    }
    Ok(trimmed)
}
