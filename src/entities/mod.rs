// Entity Models
//
// Each entity owns its SQLite table and the store functions that read and
// write it:
// - account: the single ledger account and its balance
// - transaction: immutable ledger entries

pub mod account;
pub mod transaction;

pub use account::{Account, ACCOUNT_ID};
pub use transaction::{SortDirection, Transaction};
