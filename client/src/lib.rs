//! Client-side construction of a single transaction that creates a Token-2022 mint with a
//! self-referential metadata pointer and embedded token metadata.
//!
//! The flow is [`layout`] → [`token_instructions`] → [`transactions`] → the connected
//! [`wallet`].

pub mod error;
pub mod layout;
pub mod ledger;
pub mod logs;
pub mod metadata;
pub mod mint_identity;
pub mod mollusk_helpers;
pub mod token_instructions;
pub mod transactions;
pub mod wallet;

pub use error::{
    CreateTokenError,
    ErrorKind,
    FailureReport,
};
pub use logs::LogColor;
pub use transactions::{
    CreatedToken,
    CreationState,
    Launchpad,
};
