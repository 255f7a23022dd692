//! Error types for a single token creation attempt and their display-friendly report form.

use solana_program_error::ProgramError;
use solana_sdk::signature::Signature;
use strum_macros::Display;
use thiserror::Error;

/// The category of a failed creation attempt, as exposed to the display channel.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorKind {
    MissingSigner,
    InvalidField,
    UnsupportedExtension,
    SizeExceeded,
    RentQueryFailed,
    AnchorFetchFailed,
    InvalidInstruction,
    SigningFailed,
    WalletCancelled,
    SubmissionFailed,
}

/// Every error is terminal for the attempt that produced it. A caller that wants to try again
/// starts a brand new attempt with a fresh mint identity.
#[derive(Debug, Error)]
pub enum CreateTokenError {
    #[error("no connected wallet address to act as fee payer and mint authority")]
    MissingSigner,

    #[error("invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unsupported mint extension {0}")]
    UnsupportedExtension(String),

    #[error("{what} needs {len} bytes, the limit is {max}")]
    SizeExceeded {
        what: &'static str,
        len: usize,
        max: usize,
    },

    #[error("rent exemption query failed: {0:#}")]
    RentQueryFailed(anyhow::Error),

    #[error("latest blockhash query failed: {0:#}")]
    AnchorFetchFailed(anyhow::Error),

    #[error("couldn't build instruction: {0}")]
    InvalidInstruction(#[from] ProgramError),

    #[error("local signing failed: {0}")]
    SigningFailed(String),

    #[error("wallet approval was cancelled")]
    WalletCancelled,

    #[error("submission failed{}: {reason}", fmt_signature(.signature))]
    SubmissionFailed {
        signature: Option<Signature>,
        reason: String,
    },
}

fn fmt_signature(signature: &Option<Signature>) -> String {
    signature
        .map(|sig| format!(" (signature {sig})"))
        .unwrap_or_default()
}

impl CreateTokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CreateTokenError::MissingSigner => ErrorKind::MissingSigner,
            CreateTokenError::InvalidField { .. } => ErrorKind::InvalidField,
            CreateTokenError::UnsupportedExtension(_) => ErrorKind::UnsupportedExtension,
            CreateTokenError::SizeExceeded { .. } => ErrorKind::SizeExceeded,
            CreateTokenError::RentQueryFailed(_) => ErrorKind::RentQueryFailed,
            CreateTokenError::AnchorFetchFailed(_) => ErrorKind::AnchorFetchFailed,
            CreateTokenError::InvalidInstruction(_) => ErrorKind::InvalidInstruction,
            CreateTokenError::SigningFailed(_) => ErrorKind::SigningFailed,
            CreateTokenError::WalletCancelled => ErrorKind::WalletCancelled,
            CreateTokenError::SubmissionFailed { .. } => ErrorKind::SubmissionFailed,
        }
    }

    pub fn report(&self) -> FailureReport {
        FailureReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// `{ errorKind, message }` pair handed to whatever displays the outcome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_carries_kind_and_message() {
        let report = CreateTokenError::SizeExceeded {
            what: "token metadata",
            len: 20_000,
            max: 10_240,
        }
        .report();
        assert_eq!(report.kind, ErrorKind::SizeExceeded);
        assert_eq!(
            report.message,
            "token metadata needs 20000 bytes, the limit is 10240"
        );
        assert_eq!(report.kind.to_string(), "SizeExceeded");
    }

    #[test]
    fn submission_failure_mentions_signature_when_known() {
        let without = CreateTokenError::SubmissionFailed {
            signature: None,
            reason: "blockhash not found".into(),
        };
        assert_eq!(without.to_string(), "submission failed: blockhash not found");

        let sig = Signature::default();
        let with = CreateTokenError::SubmissionFailed {
            signature: Some(sig),
            reason: "blockhash not found".into(),
        };
        assert!(with.to_string().contains(&sig.to_string()));
        assert_eq!(with.kind(), ErrorKind::SubmissionFailed);
    }
}
