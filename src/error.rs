// ⚠️ Ledger Errors
// Business-rule violations and storage failures raised by the core

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// The singleton account record is missing (configuration/data error)
    #[error("Account not found")]
    AccountNotFound,

    /// Accepting the transaction would leave the account at zero or below
    #[error("Transaction rejected: the account balance would become {balance}, it must stay above zero")]
    BalanceWouldBeNonPositive { balance: Decimal },

    /// Amount, fee or balance arithmetic left the representable decimal range
    #[error("Amount out of range: {0}")]
    ArithmeticOverflow(&'static str),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("A transaction with reference {0} already exists")]
    DuplicateReference(String),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    /// True for errors caused by the request rather than by the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LedgerError::AccountNotFound
                | LedgerError::BalanceWouldBeNonPositive { .. }
                | LedgerError::ArithmeticOverflow(_)
                | LedgerError::MissingField(_)
                | LedgerError::InvalidRequest(_)
                | LedgerError::DuplicateReference(_)
        )
    }
}
