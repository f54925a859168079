//! Account use cases: create, get, list, rename, archive.

use crate::domain::AccountType;
use crate::error::AppError;
use crate::infra::{get_connection, DbPool};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
    pub archived: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccountCreateReq {
    pub name: String,
    pub account_type: AccountType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccountRenameReq {
    pub account_id: i64,
    pub name: String,
}

const ACCOUNT_COLUMNS: &str = "id, name, account_type, archived, created_at";

fn map_account(row: &Row<'_>) -> rusqlite::Result<AccountDto> {
    let raw_type: String = row.get(2)?;
    let account_type = AccountType::from_str(&raw_type).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, "unknown account type".into())
    })?;
    Ok(AccountDto {
        id: row.get(0)?,
        name: row.get(1)?,
        account_type,
        archived: row.get::<_, i32>(3)? != 0,
        created_at: row.get(4)?,
    })
}

fn normalize_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("account name is required".into()));
    }
    Ok(name)
}

/// Names stay reserved after archival; `except` lets an account keep its own.
fn ensure_name_free(conn: &Connection, name: &str, except: Option<i64>) -> Result<(), AppError> {
    let holder: Option<i64> = conn
        .query_row("SELECT id FROM accounts WHERE name = ?1", [name], |r| r.get(0))
        .optional()?;
    match holder {
        Some(id) if Some(id) != except => Err(AppError::DuplicateName(format!(
            "account '{}' already exists",
            name
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn load_account(conn: &Connection, id: i64) -> Result<AccountDto, AppError> {
    conn.query_row(
        &format!("SELECT {} FROM accounts WHERE id = ?1", ACCOUNT_COLUMNS),
        [id],
        map_account,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("account {}", id)))
}

pub(crate) fn ensure_account_exists(conn: &Connection, id: i64) -> Result<(), AppError> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM accounts WHERE id = ?1", [id], |r| r.get(0))
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("account {}", id))),
    }
}

pub fn account_create(pool: &DbPool, req: AccountCreateReq) -> Result<AccountDto, AppError> {
    let name = normalize_name(&req.name)?;
    let now = Utc::now().to_rfc3339();

    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    ensure_name_free(&tx, name, None)?;
    tx.execute(
        "INSERT INTO accounts (name, account_type, archived, created_at) VALUES (?1, ?2, 0, ?3)",
        params![name, req.account_type.as_str(), &now],
    )?;
    let account = load_account(&tx, tx.last_insert_rowid())?;
    tx.commit()?;

    log::info!("created account {} '{}'", account.id, account.name);
    Ok(account)
}

pub fn account_get(pool: &DbPool, id: i64) -> Result<AccountDto, AppError> {
    let conn = get_connection(pool)?;
    load_account(&conn, id)
}

pub fn account_list(pool: &DbPool, include_archived: bool) -> Result<Vec<AccountDto>, AppError> {
    let conn = get_connection(pool)?;
    let sql = if include_archived {
        format!("SELECT {} FROM accounts ORDER BY id", ACCOUNT_COLUMNS)
    } else {
        format!(
            "SELECT {} FROM accounts WHERE archived = 0 ORDER BY id",
            ACCOUNT_COLUMNS
        )
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_account)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn account_rename(pool: &DbPool, req: AccountRenameReq) -> Result<AccountDto, AppError> {
    let name = normalize_name(&req.name)?;

    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    ensure_account_exists(&tx, req.account_id)?;
    ensure_name_free(&tx, name, Some(req.account_id))?;
    tx.execute(
        "UPDATE accounts SET name = ?1 WHERE id = ?2",
        params![name, req.account_id],
    )?;
    let account = load_account(&tx, req.account_id)?;
    tx.commit()?;
    Ok(account)
}

/// Hide the account from default listings. History and balance are kept.
pub fn account_archive(pool: &DbPool, id: i64) -> Result<AccountDto, AppError> {
    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let rows = tx.execute("UPDATE accounts SET archived = 1 WHERE id = ?1", [id])?;
    if rows == 0 {
        return Err(AppError::NotFound(format!("account {}", id)));
    }
    let account = load_account(&tx, id)?;
    tx.commit()?;

    log::info!("archived account {}", id);
    Ok(account)
}
