//! Derived balances. Nothing here writes; a balance is always the sum of
//! the account's signed transaction amounts at read time.

use crate::app::account::ensure_account_exists;
use crate::app::transaction::{map_transaction, TransactionDto, TRANSACTION_COLUMNS};
use crate::error::AppError;
use crate::infra::{get_connection, DbPool};
use rusqlite::OptionalExtension;
use serde::Serialize;
use std::iter::FusedIterator;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningBalanceEntry {
    pub transaction: TransactionDto,
    /// Balance including this transaction.
    pub balance_cents: i64,
}

/// Oldest-first walk over an account's transactions yielding the balance
/// after each one. The rows are a single snapshot taken when the iterator
/// is created; sums are accumulated as it advances. Consumed once.
#[derive(Debug)]
pub struct RunningBalance {
    rows: std::vec::IntoIter<TransactionDto>,
    balance: i64,
    done: bool,
}

impl RunningBalance {
    fn new(rows: Vec<TransactionDto>) -> Self {
        Self {
            rows: rows.into_iter(),
            balance: 0,
            done: false,
        }
    }
}

impl Iterator for RunningBalance {
    type Item = Result<RunningBalanceEntry, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let transaction = match self.rows.next() {
            Some(t) => t,
            None => {
                self.done = true;
                return None;
            }
        };
        match self.balance.checked_add(transaction.amount_cents) {
            Some(balance) => {
                self.balance = balance;
                Some(Ok(RunningBalanceEntry {
                    transaction,
                    balance_cents: balance,
                }))
            }
            None => {
                self.done = true;
                Some(Err(overflowed(transaction.account_id)))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.rows.len()))
        }
    }
}

impl FusedIterator for RunningBalance {}

fn overflowed(account_id: i64) -> AppError {
    AppError::InvalidInput(format!("balance of account {} overflows", account_id))
}

/// SQLite's `SUM` reports i64 overflow as a plain error with this message.
fn is_sum_overflow(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("integer overflow"))
}

/// Current balance in cents; 0 for an account without transactions.
pub fn balance_get(pool: &DbPool, account_id: i64) -> Result<i64, AppError> {
    let conn = get_connection(pool)?;
    let balance: Option<i64> = conn
        .query_row(
            "SELECT COALESCE((SELECT SUM(t.amount_cents) FROM transactions t WHERE t.account_id = a.id), 0)
             FROM accounts a WHERE a.id = ?1",
            [account_id],
            |r| r.get(0),
        )
        .optional()
        .map_err(|e| {
            if is_sum_overflow(&e) {
                overflowed(account_id)
            } else {
                e.into()
            }
        })?;
    balance.ok_or_else(|| AppError::NotFound(format!("account {}", account_id)))
}

/// Running balance ordered by date ascending, ties by id ascending. This
/// is the reverse of the display order used by `transaction_list`.
pub fn balance_running(pool: &DbPool, account_id: i64) -> Result<RunningBalance, AppError> {
    let mut conn = get_connection(pool)?;
    let tx = conn.transaction()?;
    ensure_account_exists(&tx, account_id)?;
    let rows = {
        let mut stmt = tx.prepare(&format!(
            "SELECT {} FROM transactions WHERE account_id = ?1
             ORDER BY transaction_date ASC, id ASC",
            TRANSACTION_COLUMNS
        ))?;
        let mapped = stmt.query_map([account_id], map_transaction)?;
        let mut out = Vec::new();
        for r in mapped {
            out.push(r?);
        }
        out
    };
    tx.commit()?;
    Ok(RunningBalance::new(rows))
}
