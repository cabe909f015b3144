// 🚦 Status Rule Engine
//
// Settlement status is derived, never stored:
// - no transaction            → INVALID
// - date before today         → SETTLED
// - date is today             → PENDING
// - date after today          → PENDING for ATM, FUTURE otherwise
//
// CLIENT and ATM see the net amount (amount - fee) and no fee; INTERNAL, or
// an inquiry without a channel, sees amount and fee separately.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::entities::Transaction;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Client,
    Atm,
    Internal,
}

impl Channel {
    /// Channels that only ever see the net amount
    pub fn hides_fee(&self) -> bool {
        matches!(self, Channel::Client | Channel::Atm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Invalid,
    Settled,
    Pending,
    Future,
}

/// Amount and fee as visible to the inquiring channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disclosure {
    pub amount: Decimal,
    pub fee: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStatus {
    pub reference: String,
    pub status: Status,
    pub amount: Option<Decimal>,
    pub fee: Option<Decimal>,
}

/// Classify an existing transaction by its date relative to `today`
pub fn classify(date: NaiveDate, today: NaiveDate, channel: Option<Channel>) -> Status {
    match date.cmp(&today) {
        Ordering::Less => Status::Settled,
        Ordering::Equal => Status::Pending,
        Ordering::Greater if channel == Some(Channel::Atm) => Status::Pending,
        Ordering::Greater => Status::Future,
    }
}

pub fn disclose(tx: &Transaction, channel: Option<Channel>) -> Result<Disclosure> {
    let disclosure = match channel {
        Some(channel) if channel.hides_fee() => Disclosure {
            amount: tx.net_amount()?,
            fee: None,
        },
        _ => Disclosure {
            amount: tx.amount,
            fee: Some(tx.fee),
        },
    };
    Ok(disclosure)
}

/// Full status answer for `reference`, given the lookup result
pub fn transaction_status(
    reference: &str,
    found: Option<&Transaction>,
    today: NaiveDate,
    channel: Option<Channel>,
) -> Result<TransactionStatus> {
    let status = match found {
        None => TransactionStatus {
            reference: reference.to_string(),
            status: Status::Invalid,
            amount: None,
            fee: None,
        },
        Some(tx) => {
            let disclosure = disclose(tx, channel)?;
            TransactionStatus {
                reference: reference.to_string(),
                status: classify(tx.date, today, channel),
                amount: Some(disclosure.amount),
                fee: disclosure.fee,
            }
        }
    };
    Ok(status)
}
