// 📦 Wire Types
//
// JSON bodies and query strings, mapped field by field to and from the
// stored entities. No implicit copying: every field crosses in one place.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::NewTransaction;
use crate::entities::{SortDirection, Transaction};
use crate::error::{LedgerError, Result};
use crate::status::{Channel, Status, TransactionStatus};

// ============================================================================
// TRANSACTION BODY
// ============================================================================

/// Transaction as submitted by `POST /transactions` and returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "accountIBAN", default, skip_serializing_if = "Option::is_none")]
    pub account_iban: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(alias = "ammount", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransactionDto {
    /// Validate required fields and map to a transaction request
    ///
    /// `accountIBAN` and `amount` are required; a missing fee is zero.
    pub fn into_new_transaction(self) -> Result<NewTransaction> {
        let account_iban = self
            .account_iban
            .filter(|iban| !iban.is_empty())
            .ok_or(LedgerError::MissingField("accountIBAN"))?;
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;

        Ok(NewTransaction {
            reference: self.reference,
            account_iban,
            date: self.date,
            amount,
            fee: self.fee.unwrap_or(Decimal::ZERO),
            description: self.description,
        })
    }
}

impl From<Transaction> for TransactionDto {
    fn from(tx: Transaction) -> Self {
        Self {
            reference: Some(tx.reference),
            account_iban: Some(tx.account_iban),
            date: Some(tx.date),
            amount: Some(tx.amount),
            fee: Some(tx.fee),
            description: tx.description,
        }
    }
}

// ============================================================================
// STATUS BODY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStatusDto {
    pub reference: String,

    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,
}

impl From<TransactionStatus> for TransactionStatusDto {
    fn from(status: TransactionStatus) -> Self {
        Self {
            reference: status.reference,
            status: status.status,
            amount: status.amount,
            fee: status.fee,
        }
    }
}

// ============================================================================
// QUERY STRINGS
// ============================================================================

/// `GET /transactions?IBAN=&sortAmount=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "IBAN", default)]
    pub iban: Option<String>,

    #[serde(rename = "sortAmount", alias = "sortAmmount", default)]
    pub sort_amount: Option<SortDirection>,
}

/// `GET /transactions/status?reference=&channel=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub channel: Option<Channel>,
}

impl StatusQuery {
    pub fn required_reference(&self) -> Result<&str> {
        self.reference
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or(LedgerError::MissingField("reference"))
    }
}
