//! Builds the ordered instruction list that creates a Token-2022 mint carrying its own metadata.

use solana_address::Address;
use solana_instruction::Instruction;
use spl_token_2022_interface::{
    extension::metadata_pointer,
    instruction::initialize_mint2,
};
use spl_token_metadata_interface::{
    instruction::{
        initialize as initialize_metadata,
        update_field,
    },
    state::Field,
};

use crate::{
    error::CreateTokenError,
    layout::FundedLayout,
    metadata::{
        MintParameters,
        TokenMetadata,
    },
};

/// The owning program for the new mint. This must be Token-2022: an account owned by the legacy
/// token program can't hold extensions.
pub const TOKEN_2022_PROGRAM_ID: Address = spl_token_2022_interface::ID;

/// Returns, in order:
/// 1. create the mint account, funded for its final length but allocated without the metadata
/// 2. initialize the metadata pointer to the mint itself
/// 3. initialize the mint
/// 4. initialize the token metadata in the mint account
///
/// followed by one update-field instruction per additional metadata pair.
///
/// The metadata pointer has to be initialized before the mint; mint initialization locks the
/// extension configuration.
pub fn create_token_instructions(
    payer: Option<&Address>,
    layout: &FundedLayout,
    params: &MintParameters,
    metadata: &TokenMetadata,
) -> Result<Vec<Instruction>, CreateTokenError> {
    let payer = payer.ok_or(CreateTokenError::MissingSigner)?;
    let mint = metadata.mint();

    let create_mint_account = solana_system_interface::instruction::create_account(
        payer,
        mint,
        layout.required_lamports,
        layout.layout.account_len as u64,
        &TOKEN_2022_PROGRAM_ID,
    );

    let initialize_metadata_pointer = metadata_pointer::instruction::initialize(
        &TOKEN_2022_PROGRAM_ID,
        mint,
        Some(*payer),
        Some(*mint),
    )?;

    let initialize_mint = initialize_mint2(
        &TOKEN_2022_PROGRAM_ID,
        mint,
        &params.mint_authority,
        params.freeze_authority.as_ref(),
        params.decimals,
    )?;

    let write_metadata = initialize_metadata(
        &TOKEN_2022_PROGRAM_ID,
        mint,
        payer,
        mint,
        &params.mint_authority,
        metadata.name().to_string(),
        metadata.symbol().to_string(),
        metadata.uri().to_string(),
    );

    let additional_fields = metadata.additional_metadata().iter().map(|(key, value)| {
        update_field(
            &TOKEN_2022_PROGRAM_ID,
            mint,
            payer,
            Field::Key(key.clone()),
            value.clone(),
        )
    });

    Ok([
        create_mint_account,
        initialize_metadata_pointer,
        initialize_mint,
        write_metadata,
    ]
    .into_iter()
    .chain(additional_fields)
    .collect())
}
