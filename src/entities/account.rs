// 💳 Account Entity - the single ledger account
//
// Identity is fixed at creation (ACCOUNT_ID); the balance is the only value
// that changes, and only through the balance rule engine.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::decimal_column;
use crate::error::{LedgerError, Result};

/// Identifier of the singleton account record
pub const ACCOUNT_ID: i64 = 1;

// ============================================================================
// ACCOUNT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identity - never changes
    pub id: i64,

    /// Current balance, exact decimal
    pub balance: Decimal,

    /// Last time the balance was written
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create the singleton account with an opening balance
    pub fn new(balance: Decimal) -> Self {
        Account {
            id: ACCOUNT_ID,
            balance,
            updated_at: Utc::now(),
        }
    }

    /// Check if account has positive balance
    pub fn is_positive(&self) -> bool {
        self.balance > Decimal::ZERO
    }
}

// ============================================================================
// ACCOUNT STORE
// ============================================================================

/// Load the singleton account, failing with `AccountNotFound` if it was never created
pub fn get_account(conn: &Connection) -> Result<Account> {
    find_account(conn)?.ok_or(LedgerError::AccountNotFound)
}

/// Load the singleton account if it exists
pub fn find_account(conn: &Connection) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            "SELECT id, balance, updated_at FROM account WHERE id = ?1",
            params![ACCOUNT_ID],
            |row| {
                let updated_at: String = row.get(2)?;
                Ok(Account {
                    id: row.get(0)?,
                    balance: decimal_column(row, 1)?,
                    updated_at: DateTime::parse_from_rfc3339(&updated_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                2,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?,
                })
            },
        )
        .optional()?;

    Ok(account)
}

/// Create the account, or overwrite its balance if it already exists
pub fn save_account(conn: &Connection, account: &Account) -> Result<()> {
    conn.execute(
        "INSERT INTO account (id, balance, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET balance = excluded.balance, updated_at = excluded.updated_at",
        params![
            account.id,
            account.balance.to_string(),
            account.updated_at.to_rfc3339()
        ],
    )?;

    Ok(())
}

/// Persist a new balance for the existing account
pub fn update_balance(conn: &Connection, balance: Decimal) -> Result<Account> {
    let now = Utc::now();
    let updated = conn.execute(
        "UPDATE account SET balance = ?1, updated_at = ?2 WHERE id = ?3",
        params![balance.to_string(), now.to_rfc3339(), ACCOUNT_ID],
    )?;

    if updated == 0 {
        return Err(LedgerError::AccountNotFound);
    }

    Ok(Account {
        id: ACCOUNT_ID,
        balance,
        updated_at: now,
    })
}

// ============================================================================
// TESTS
// ============================================================================
