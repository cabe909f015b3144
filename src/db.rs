// 🗄️ Database - SQLite schema and column decoding
//
// Money is stored as decimal TEXT and dates as YYYY-MM-DD.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

/// Calendar dates are stored as ISO `YYYY-MM-DD` text
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Open (or create) the ledger database file and make sure the schema exists
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {:?}", path))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("Failed to enable WAL mode")?;

    // ==========================================================================
    // Account Table (single row, fixed id)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            balance TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Transactions Table
    // Amounts are exact decimal text, never REAL
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reference TEXT UNIQUE NOT NULL,
            account_iban TEXT NOT NULL,
            date TEXT NOT NULL,
            amount TEXT NOT NULL,
            fee TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_iban ON transactions(account_iban)",
        [],
    )?;

    Ok(())
}

/// Read a decimal stored as text in column `idx`
pub(crate) fn decimal_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a calendar date stored as ISO text in column `idx`
pub(crate) fn date_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
