// ⚖️ Balance Rule Engine
//
// B' = B + (amount - fee). A transaction that would leave the account at
// zero or below is rejected whole: no balance write, no transaction row.
// The balance is written before the transaction, both inside one
// IMMEDIATE database transaction.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;

use crate::entities::{account, transaction, Account, Transaction};
use crate::error::{LedgerError, Result};
use crate::reference::{assign_reference, ReferenceMode};

/// A validated transaction request, before reference and date are resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub reference: Option<String>,
    pub account_iban: String,
    pub date: Option<NaiveDate>,
    pub amount: Decimal,
    pub fee: Decimal,
    pub description: Option<String>,
}

/// Outcome of an accepted transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub previous_balance: Decimal,
    pub account: Account,
    pub transaction: Transaction,
}

/// Compute the balance after applying `amount - fee`, rejecting non-positive results
pub fn next_balance(balance: Decimal, amount: Decimal, fee: Decimal) -> Result<Decimal> {
    let new_balance = amount
        .checked_sub(fee)
        .and_then(|net| balance.checked_add(net))
        .ok_or(LedgerError::ArithmeticOverflow("balance"))?;
    if new_balance <= Decimal::ZERO {
        return Err(LedgerError::BalanceWouldBeNonPositive {
            balance: new_balance,
        });
    }
    Ok(new_balance)
}

/// Apply a transaction to the account and store it
///
/// `today` resolves a missing date and seeds reference derivation.
pub fn apply_transaction(
    conn: &mut Connection,
    new_tx: NewTransaction,
    today: NaiveDate,
    mode: ReferenceMode,
) -> Result<Applied> {
    let db_tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let current = account::get_account(&db_tx)?;
    let new_balance = next_balance(current.balance, new_tx.amount, new_tx.fee)?;

    // Balance first: if this write fails nothing else happens
    let updated = account::update_balance(&db_tx, new_balance)?;

    let reference = assign_reference(new_tx.reference.as_deref(), today, mode, |candidate| {
        transaction::reference_exists(&db_tx, candidate)
    })?;

    let tx = Transaction::new(
        reference,
        new_tx.account_iban,
        new_tx.date.unwrap_or(today),
        new_tx.amount,
        new_tx.fee,
        new_tx.description,
    );
    let stored = transaction::insert_transaction(&db_tx, &tx)?;

    db_tx.commit()?;

    Ok(Applied {
        previous_balance: current.balance,
        account: updated,
        transaction: stored,
    })
}
