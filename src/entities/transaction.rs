// 🧾 Transaction Entity - immutable ledger entries
//
// A transaction is written once and never updated. Lookups go by reference
// (unique) or by account IBAN.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::{date_column, decimal_column, DATE_FORMAT};
use crate::error::{LedgerError, Result};

// ============================================================================
// SORT DIRECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

// ============================================================================
// TRANSACTION ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Row id, reflects insertion order (0 until stored)
    pub id: i64,

    /// Unique business reference
    pub reference: String,

    /// Account identifier used for filtering
    pub account_iban: String,

    /// Business date of the transaction (calendar day)
    pub date: NaiveDate,

    /// Signed amount
    pub amount: Decimal,

    /// Fee charged on top, may be zero
    pub fee: Decimal,

    pub description: Option<String>,

    /// System time: when this record was created in our system
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        reference: String,
        account_iban: String,
        date: NaiveDate,
        amount: Decimal,
        fee: Decimal,
        description: Option<String>,
    ) -> Self {
        Transaction {
            id: 0,
            reference,
            account_iban,
            date,
            amount,
            fee,
            description,
            created_at: Utc::now(),
        }
    }

    /// Amount actually moved on the balance: amount minus fee
    pub fn net_amount(&self) -> Result<Decimal> {
        self.amount
            .checked_sub(self.fee)
            .ok_or(LedgerError::ArithmeticOverflow("amount minus fee"))
    }
}

// ============================================================================
// TRANSACTION STORE
// ============================================================================

const SELECT_COLUMNS: &str =
    "SELECT id, reference, account_iban, date, amount, fee, description, created_at FROM transactions";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let created_at: String = row.get(7)?;

    Ok(Transaction {
        id: row.get(0)?,
        reference: row.get(1)?,
        account_iban: row.get(2)?,
        date: date_column(row, 3)?,
        amount: decimal_column(row, 4)?,
        fee: decimal_column(row, 5)?,
        description: row.get(6)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
            })?,
    })
}

/// Insert a transaction and return it with its assigned row id
pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<Transaction> {
    let result = conn.execute(
        "INSERT INTO transactions (
            reference, account_iban, date, amount, fee, description, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            tx.reference,
            tx.account_iban,
            tx.date.format(DATE_FORMAT).to_string(),
            tx.amount.to_string(),
            tx.fee.to_string(),
            tx.description,
            tx.created_at.to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => {
            let mut stored = tx.clone();
            stored.id = conn.last_insert_rowid();
            Ok(stored)
        }
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(LedgerError::DuplicateReference(tx.reference.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Find a transaction by its reference
pub fn find_by_reference(conn: &Connection, reference: &str) -> Result<Option<Transaction>> {
    let tx = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE reference = ?1"),
            params![reference],
            map_row,
        )
        .optional()?;

    Ok(tx)
}

pub fn reference_exists(conn: &Connection, reference: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM transactions WHERE reference = ?1)",
        params![reference],
        |row| row.get(0),
    )?;

    Ok(exists)
}

/// List transactions, optionally filtered by IBAN and sorted by amount
///
/// An empty or missing IBAN matches every transaction. Without a sort
/// direction the result is in insertion order; sorting is stable, so equal
/// amounts keep their insertion order too.
pub fn list_transactions(
    conn: &Connection,
    iban: Option<&str>,
    sort: Option<SortDirection>,
) -> Result<Vec<Transaction>> {
    let mut transactions = match iban.filter(|iban| !iban.is_empty()) {
        Some(iban) => {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLUMNS} WHERE account_iban = ?1 ORDER BY id"))?;
            let rows = stmt.query_map(params![iban], map_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
            let rows = stmt.query_map([], map_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    // Decimal text does not sort numerically in SQL, so order in memory
    match sort {
        Some(SortDirection::Asc) => transactions.sort_by(|a, b| a.amount.cmp(&b.amount)),
        Some(SortDirection::Desc) => transactions.sort_by(|a, b| b.amount.cmp(&a.amount)),
        None => {}
    }

    Ok(transactions)
}

pub fn count_transactions(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================
