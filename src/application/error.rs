use thiserror::Error;

use crate::domain::{AmountError, EntryKind, FormatError, LedgerError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unrecognized entry: {0}")]
    Format(#[from] FormatError),

    #[error("Invalid amount: {0}")]
    Amount(#[from] AmountError),

    #[error("Ledger limit reached: {0}")]
    Ledger(#[from] LedgerError),

    #[error("No {kind} entry at position {index} ({len} entries)")]
    IndexOutOfRange {
        kind: EntryKind,
        index: usize,
        len: usize,
    },

    #[error("Invalid callback data: {0:?}")]
    InvalidCallback(String),

    #[error("Unknown command: /{0}")]
    UnknownCommand(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the user can fix this by sending different input.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, AppError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_storage_error_names_cause_once() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("disk full"));
        let err = AppError::from(err.context("Failed to write ledger file").unwrap_err());

        assert_eq!(err.to_string(), "Storage error: Failed to write ledger file");
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("disk full").count(), 1, "{chain}");
    }
}
