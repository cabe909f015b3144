// 🏦 Operations Service
//
// Entry point for every ledger operation. Owns the shared connection and
// runs the stores and rule engines in order for each request.

use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::balance::apply_transaction;
use crate::dto::{ListQuery, TransactionDto, TransactionStatusDto};
use crate::entities::{account, transaction, Account};
use crate::error::{LedgerError, Result};
use crate::reference::ReferenceMode;
use crate::status::{transaction_status, Channel};

/// Current calendar day in the local time zone
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Shared ledger handle; clones share the same connection
#[derive(Clone)]
pub struct Ledger {
    db: Arc<Mutex<Connection>>,
    reference_mode: ReferenceMode,
    today: fn() -> NaiveDate,
}

impl Ledger {
    pub fn new(conn: Connection, reference_mode: ReferenceMode) -> Self {
        Ledger {
            db: Arc::new(Mutex::new(conn)),
            reference_mode,
            today: local_today,
        }
    }

    /// Replace the clock used to resolve "today"
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    // ========================================================================
    // ACCOUNT
    // ========================================================================

    /// Create the account, or reset its balance
    pub fn open_account(&self, balance: Decimal) -> Result<Account> {
        if balance <= Decimal::ZERO {
            return Err(LedgerError::InvalidRequest(format!(
                "opening balance must be above zero, got {}",
                balance
            )));
        }

        let account = Account::new(balance);
        account::save_account(&*self.conn()?, &account)?;
        info!(balance = %account.balance, "account opened");
        Ok(account)
    }

    /// Create the account from `initial_balance` unless it already exists
    pub fn ensure_account(&self, initial_balance: Option<Decimal>) -> Result<Option<Account>> {
        if let Some(existing) = account::find_account(&*self.conn()?)? {
            debug!(balance = %existing.balance, "account already present");
            return Ok(Some(existing));
        }

        match initial_balance {
            Some(balance) => self.open_account(balance).map(Some),
            None => {
                warn!("no account record; transactions will be rejected until one is created");
                Ok(None)
            }
        }
    }

    pub fn account(&self) -> Result<Account> {
        account::get_account(&*self.conn()?)
    }

    // ========================================================================
    // TRANSACTIONS
    // ========================================================================

    /// Validate, apply and store a submitted transaction
    ///
    /// Returns the submission echoed back with its assigned reference, date
    /// and fee.
    pub fn create_transaction(&self, dto: TransactionDto) -> Result<TransactionDto> {
        let new_tx = dto.into_new_transaction()?;
        let today = (self.today)();

        let mut conn = self.conn()?;
        match apply_transaction(&mut conn, new_tx, today, self.reference_mode) {
            Ok(applied) => {
                info!(
                    reference = %applied.transaction.reference,
                    iban = %applied.transaction.account_iban,
                    amount = %applied.transaction.amount,
                    fee = %applied.transaction.fee,
                    previous_balance = %applied.previous_balance,
                    balance = %applied.account.balance,
                    "transaction accepted"
                );
                Ok(applied.transaction.into())
            }
            Err(e) => {
                if e.is_client_error() {
                    warn!(error = %e, "transaction rejected");
                }
                Err(e)
            }
        }
    }

    pub fn list_transactions(&self, query: &ListQuery) -> Result<Vec<TransactionDto>> {
        let transactions =
            transaction::list_transactions(&*self.conn()?, query.iban.as_deref(), query.sort_amount)?;

        debug!(count = transactions.len(), iban = ?query.iban, sort = ?query.sort_amount, "listed transactions");
        Ok(transactions.into_iter().map(TransactionDto::from).collect())
    }

    pub fn transaction_status(
        &self,
        reference: &str,
        channel: Option<Channel>,
    ) -> Result<TransactionStatusDto> {
        let found = transaction::find_by_reference(&*self.conn()?, reference)?;
        let status = transaction_status(reference, found.as_ref(), (self.today)(), channel)?;

        debug!(reference, status = ?status.status, channel = ?channel, "status inquiry");
        Ok(status.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;
    use crate::entities::SortDirection;
    use crate::status::Status;
    use rust_decimal_macros::dec;

    const IBAN: &str = "ES10123456789098765432";

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn test_ledger(balance: Option<Decimal>) -> Ledger {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        let ledger = Ledger::new(conn, ReferenceMode::Sequenced).with_clock(fixed_today);
        ledger.ensure_account(balance).unwrap();
        ledger
    }

    fn dto(reference: Option<&str>, date: Option<NaiveDate>, amount: Decimal, fee: Decimal) -> TransactionDto {
        TransactionDto {
            reference: reference.map(str::to_string),
            account_iban: Some(IBAN.to_string()),
            date,
            amount: Some(amount),
            fee: Some(fee),
            description: None,
        }
    }

    #[test]
    fn test_create_transaction_updates_balance() {
        let ledger = test_ledger(Some(dec!(100)));

        let created = ledger
            .create_transaction(dto(None, None, dec!(2.50), dec!(1.00)))
            .unwrap();

        assert!(created.reference.is_some());
        assert_eq!(created.date, Some(fixed_today()));
        assert_eq!(ledger.account().unwrap().balance, dec!(101.50));
    }

    #[test]
    fn test_create_transaction_rejects_non_positive_balance() {
        let ledger = test_ledger(Some(dec!(10)));

        let err = ledger
            .create_transaction(dto(Some("TX"), None, dec!(-10), dec!(1)))
            .unwrap_err();

        assert!(matches!(err, LedgerError::BalanceWouldBeNonPositive { .. }));
        assert_eq!(ledger.account().unwrap().balance, dec!(10));
        assert!(ledger.list_transactions(&ListQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_create_transaction_without_account() {
        let ledger = test_ledger(None);

        let err = ledger
            .create_transaction(dto(None, None, dec!(1), dec!(0)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound));
    }

    #[test]
    fn test_open_account_rejects_non_positive_balance() {
        let ledger = test_ledger(None);

        assert!(matches!(
            ledger.open_account(dec!(0)),
            Err(LedgerError::InvalidRequest(_))
        ));
        assert!(matches!(ledger.account(), Err(LedgerError::AccountNotFound)));
    }

    #[test]
    fn test_ensure_account_keeps_existing_balance() {
        let ledger = test_ledger(Some(dec!(100)));

        let account = ledger.ensure_account(Some(dec!(5))).unwrap().unwrap();
        assert_eq!(account.balance, dec!(100));
    }

    #[test]
    fn test_list_transactions_filters_and_sorts() {
        let ledger = test_ledger(Some(dec!(100)));
        ledger.create_transaction(dto(Some("A"), None, dec!(1), dec!(0))).unwrap();
        ledger.create_transaction(dto(Some("B"), None, dec!(10), dec!(0))).unwrap();
        let mut other = dto(Some("C"), None, dec!(5), dec!(0));
        other.account_iban = Some("OTHER".to_string());
        ledger.create_transaction(other).unwrap();

        let query = ListQuery {
            iban: Some(IBAN.to_string()),
            sort_amount: Some(SortDirection::Desc),
        };
        let listed = ledger.list_transactions(&query).unwrap();
        let references: Vec<_> = listed.iter().filter_map(|t| t.reference.as_deref()).collect();
        assert_eq!(references, vec!["B", "A"]);
    }

    #[test]
    fn test_transaction_status_flow() {
        let ledger = test_ledger(Some(dec!(100)));
        let tomorrow = fixed_today().succ_opt();
        ledger
            .create_transaction(dto(Some("TX"), tomorrow, dec!(10), dec!(1)))
            .unwrap();

        let atm = ledger.transaction_status("TX", Some(Channel::Atm)).unwrap();
        assert_eq!(atm.status, Status::Pending);
        assert_eq!(atm.amount, Some(dec!(9)));
        assert_eq!(atm.fee, None);

        let internal = ledger.transaction_status("TX", Some(Channel::Internal)).unwrap();
        assert_eq!(internal.status, Status::Future);
        assert_eq!(internal.amount, Some(dec!(10)));
        assert_eq!(internal.fee, Some(dec!(1)));

        let unknown = ledger.transaction_status("NOPE", Some(Channel::Client)).unwrap();
        assert_eq!(unknown.status, Status::Invalid);
        assert_eq!(unknown.reference, "NOPE");
    }
}
