// Account Ledger - Core Library
// Exposes all modules for use in the API server, the admin CLI, and tests

pub mod api;
pub mod balance;        // Balance rule engine
pub mod config;
pub mod db;
pub mod dto;            // Wire types and field mapping
pub mod entities;       // Account + transaction stores
pub mod error;
pub mod logging;
pub mod operations;     // Ledger service
pub mod reference;      // Reference assignment
pub mod status;         // Status rule engine

// Re-export commonly used types
pub use api::{router, ApiError, AppState};
pub use balance::{apply_transaction, next_balance, Applied, NewTransaction};
pub use config::Config;
pub use db::{open_database, setup_database};
pub use dto::{ListQuery, StatusQuery, TransactionDto, TransactionStatusDto};
pub use entities::{Account, SortDirection, Transaction, ACCOUNT_ID};
pub use error::{LedgerError, Result};
pub use operations::{local_today, Ledger};
pub use reference::{assign_reference, derive_reference, ReferenceMode};
pub use status::{classify, disclose, transaction_status, Channel, Disclosure, Status, TransactionStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
