//! Transaction use cases: add, get, update, delete, list by account.

use crate::app::account::ensure_account_exists;
use crate::app::category::{load_category, uncategorized_id};
use crate::domain::{validate_amount, validate_date, TransactionKind};
use crate::error::AppError;
use crate::infra::{get_connection, DbPool};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// Upper bound for `limit` in [`transaction_list`].
pub const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: i64,
    pub account_id: i64,
    pub category_id: i64,
    pub amount_cents: i64,
    pub transaction_type: TransactionKind,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub created_at: String,
}

/// `category_id: None` files the transaction under the default category.
/// `transaction_type`, when given, must agree with the sign of the amount.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionAddReq {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount_cents: i64,
    pub transaction_type: Option<TransactionKind>,
    pub description: String,
    pub transaction_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionUpdateReq {
    pub transaction_id: i64,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub amount_cents: Option<i64>,
    pub description: Option<String>,
    pub transaction_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionListReq {
    pub account_id: i64,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, account_id, category_id, amount_cents, transaction_type, description, transaction_date, created_at";

pub(crate) fn map_transaction(row: &Row<'_>) -> rusqlite::Result<TransactionDto> {
    let raw_kind: String = row.get(4)?;
    let transaction_type = TransactionKind::from_str(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, "unknown transaction type".into())
    })?;
    Ok(TransactionDto {
        id: row.get(0)?,
        account_id: row.get(1)?,
        category_id: row.get(2)?,
        amount_cents: row.get(3)?,
        transaction_type,
        description: row.get(5)?,
        transaction_date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn load_transaction(conn: &Connection, id: i64) -> Result<TransactionDto, AppError> {
    conn.query_row(
        &format!(
            "SELECT {} FROM transactions WHERE id = ?1",
            TRANSACTION_COLUMNS
        ),
        [id],
        map_transaction,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("transaction {}", id)))
}

/// An explicit category must exist; only an omitted one falls back.
fn resolve_category(conn: &Connection, category_id: Option<i64>) -> Result<i64, AppError> {
    match category_id {
        Some(id) => Ok(load_category(conn, id)?.id),
        None => uncategorized_id(conn),
    }
}

pub fn transaction_add(pool: &DbPool, req: TransactionAddReq) -> Result<TransactionDto, AppError> {
    let kind = validate_amount(req.amount_cents, req.transaction_type)?;
    let transaction_date = validate_date(req.transaction_date)?;
    let description = req.description.trim();
    let now = Utc::now().to_rfc3339();

    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    ensure_account_exists(&tx, req.account_id)?;
    let category_id = resolve_category(&tx, req.category_id)?;
    tx.execute(
        "INSERT INTO transactions (account_id, category_id, amount_cents, transaction_type, description, transaction_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            req.account_id,
            category_id,
            req.amount_cents,
            kind.as_str(),
            description,
            transaction_date,
            &now,
        ],
    )?;
    let transaction = load_transaction(&tx, tx.last_insert_rowid())?;
    tx.commit()?;

    log::debug!(
        "added transaction {} to account {} ({} cents)",
        transaction.id,
        transaction.account_id,
        transaction.amount_cents
    );
    Ok(transaction)
}

pub fn transaction_get(pool: &DbPool, id: i64) -> Result<TransactionDto, AppError> {
    let conn = get_connection(pool)?;
    load_transaction(&conn, id)
}

/// Merge the supplied fields into the stored record and validate the
/// result as a whole.
pub fn transaction_update(
    pool: &DbPool,
    req: TransactionUpdateReq,
) -> Result<TransactionDto, AppError> {
    update_tracking_account(pool, req).map(|(_, updated)| updated)
}

/// Same as [`transaction_update`], also returning the account the
/// transaction belonged to before the update, read in the same write.
pub(crate) fn update_tracking_account(
    pool: &DbPool,
    req: TransactionUpdateReq,
) -> Result<(i64, TransactionDto), AppError> {
    if let Some(amount) = req.amount_cents {
        validate_amount(amount, None)?;
    }
    if let Some(date) = req.transaction_date {
        validate_date(date)?;
    }

    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = load_transaction(&tx, req.transaction_id)?;

    let account_id = req.account_id.unwrap_or(current.account_id);
    ensure_account_exists(&tx, account_id)?;
    let category_id = match req.category_id {
        Some(id) => load_category(&tx, id)?.id,
        None => current.category_id,
    };
    let amount_cents = req.amount_cents.unwrap_or(current.amount_cents);
    let kind = validate_amount(amount_cents, None)?;
    let description = req
        .description
        .as_deref()
        .map(|s| s.trim().to_string())
        .unwrap_or(current.description);
    let transaction_date = req.transaction_date.unwrap_or(current.transaction_date);

    tx.execute(
        "UPDATE transactions SET account_id = ?1, category_id = ?2, amount_cents = ?3, transaction_type = ?4, description = ?5, transaction_date = ?6
         WHERE id = ?7",
        params![
            account_id,
            category_id,
            amount_cents,
            kind.as_str(),
            &description,
            transaction_date,
            current.id,
        ],
    )?;
    let transaction = load_transaction(&tx, current.id)?;
    tx.commit()?;
    Ok((current.account_id, transaction))
}

/// Permanently remove a transaction and return what was removed.
pub fn transaction_delete(pool: &DbPool, id: i64) -> Result<TransactionDto, AppError> {
    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let removed = load_transaction(&tx, id)?;
    tx.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    tx.commit()?;

    log::debug!("deleted transaction {} from account {}", id, removed.account_id);
    Ok(removed)
}

/// Newest first; ties on date are ordered by id ascending so pages are
/// stable.
pub fn transaction_list(
    pool: &DbPool,
    req: TransactionListReq,
) -> Result<Vec<TransactionDto>, AppError> {
    let limit = match req.limit {
        Some(n) if !(1..=MAX_PAGE_SIZE).contains(&n) => {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )))
        }
        Some(n) => n,
        None => -1,
    };
    let offset = req.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::InvalidInput("offset must not be negative".into()));
    }

    let conn = get_connection(pool)?;
    ensure_account_exists(&conn, req.account_id)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions WHERE account_id = ?1
         ORDER BY transaction_date DESC, id ASC LIMIT ?2 OFFSET ?3",
        TRANSACTION_COLUMNS
    ))?;
    let rows = stmt.query_map(params![req.account_id, limit, offset], map_transaction)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
