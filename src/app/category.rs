//! Category use cases: create, list, get, update, delete.
//!
//! The default category (`Uncategorized`) is seeded by the first migration.
//! It cannot be renamed, re-parented or deleted, and no other category may
//! take its name.

use crate::domain::UNCATEGORIZED;
use crate::error::AppError;
use crate::infra::{get_connection, DbPool};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CategoryCreateReq {
    pub name: String,
    pub parent_id: Option<i64>,
}

/// `parent_id` moves the category under another one; `clear_parent`
/// makes it a root. Supplying both is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CategoryUpdateReq {
    pub category_id: i64,
    pub name: Option<String>,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub clear_parent: bool,
}

/// Result of deleting a category: how many children were re-parented and
/// how many transactions moved to the default category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDeleteResult {
    pub deleted_id: i64,
    pub reparented_children: usize,
    pub reassigned_transactions: usize,
}

const CATEGORY_COLUMNS: &str = "id, name, parent_id, created_at";

fn map_category(row: &Row<'_>) -> rusqlite::Result<CategoryDto> {
    Ok(CategoryDto {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn normalize_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("category name is required".into()));
    }
    if name == UNCATEGORIZED {
        return Err(AppError::DuplicateName(format!(
            "'{}' is reserved for the default category",
            UNCATEGORIZED
        )));
    }
    Ok(name)
}

/// Id of the default category.
pub(crate) fn uncategorized_id(conn: &Connection) -> Result<i64, AppError> {
    conn.query_row(
        "SELECT id FROM categories WHERE name = ?1 AND parent_id IS NULL ORDER BY id LIMIT 1",
        [UNCATEGORIZED],
        |r| r.get(0),
    )
    .optional()?
    .ok_or_else(|| {
        log::error!("default category is missing");
        AppError::StorageUnavailable("default category is missing".into())
    })
}

pub(crate) fn load_category(conn: &Connection, id: i64) -> Result<CategoryDto, AppError> {
    conn.query_row(
        &format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLUMNS),
        [id],
        map_category,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("category {}", id)))
}

fn ensure_parent_exists(conn: &Connection, parent_id: i64) -> Result<(), AppError> {
    match load_category(conn, parent_id) {
        Ok(_) => Ok(()),
        Err(AppError::NotFound(_)) => Err(AppError::NotFound(format!(
            "parent category {}",
            parent_id
        ))),
        Err(e) => Err(e),
    }
}

/// True if `candidate` is `id` itself or sits somewhere below it.
fn is_self_or_descendant(conn: &Connection, id: i64, candidate: i64) -> Result<bool, AppError> {
    let hit: Option<i64> = conn
        .query_row(
            "WITH RECURSIVE subtree(id) AS (
                SELECT ?1
                UNION
                SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
             )
             SELECT 1 FROM subtree WHERE id = ?2",
            params![id, candidate],
            |r| r.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

pub fn category_create(pool: &DbPool, req: CategoryCreateReq) -> Result<CategoryDto, AppError> {
    let name = normalize_name(&req.name)?;
    let now = Utc::now().to_rfc3339();

    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if let Some(parent_id) = req.parent_id {
        ensure_parent_exists(&tx, parent_id)?;
    }
    tx.execute(
        "INSERT INTO categories (name, parent_id, created_at) VALUES (?1, ?2, ?3)",
        params![name, req.parent_id, &now],
    )?;
    let category = load_category(&tx, tx.last_insert_rowid())?;
    tx.commit()?;
    Ok(category)
}

pub fn category_get(pool: &DbPool, id: i64) -> Result<CategoryDto, AppError> {
    let conn = get_connection(pool)?;
    load_category(&conn, id)
}

pub fn category_list(pool: &DbPool) -> Result<Vec<CategoryDto>, AppError> {
    let conn = get_connection(pool)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM categories ORDER BY id",
        CATEGORY_COLUMNS
    ))?;
    let rows = stmt.query_map([], map_category)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn category_update(pool: &DbPool, req: CategoryUpdateReq) -> Result<CategoryDto, AppError> {
    if req.clear_parent && req.parent_id.is_some() {
        return Err(AppError::InvalidInput(
            "parent_id and clear_parent are mutually exclusive".into(),
        ));
    }
    let new_name = match req.name.as_deref() {
        Some(n) => Some(normalize_name(n)?.to_string()),
        None => None,
    };

    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = load_category(&tx, req.category_id)?;
    if current.id == uncategorized_id(&tx)? {
        return Err(AppError::InvalidInput(
            "the default category cannot be modified".into(),
        ));
    }

    let parent_id = if req.clear_parent {
        None
    } else if let Some(parent_id) = req.parent_id {
        ensure_parent_exists(&tx, parent_id)?;
        if is_self_or_descendant(&tx, current.id, parent_id)? {
            return Err(AppError::InvalidInput(format!(
                "category {} cannot be placed under itself or its descendant {}",
                current.id, parent_id
            )));
        }
        Some(parent_id)
    } else {
        current.parent_id
    };
    let name = new_name.unwrap_or(current.name);

    tx.execute(
        "UPDATE categories SET name = ?1, parent_id = ?2 WHERE id = ?3",
        params![&name, parent_id, current.id],
    )?;
    let category = load_category(&tx, current.id)?;
    tx.commit()?;
    Ok(category)
}

/// Delete a category. Children move up to the deleted category's parent
/// and its transactions move to the default category, all in one
/// transaction. Balances are unaffected.
pub fn category_delete(pool: &DbPool, id: i64) -> Result<CategoryDeleteResult, AppError> {
    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let target = load_category(&tx, id)?;
    let fallback = uncategorized_id(&tx)?;
    if target.id == fallback {
        return Err(AppError::InvalidInput(
            "the default category cannot be deleted".into(),
        ));
    }

    let reparented_children = tx.execute(
        "UPDATE categories SET parent_id = ?1 WHERE parent_id = ?2",
        params![target.parent_id, id],
    )?;
    let reassigned_transactions = tx.execute(
        "UPDATE transactions SET category_id = ?1 WHERE category_id = ?2",
        params![fallback, id],
    )?;
    tx.execute("DELETE FROM categories WHERE id = ?1", [id])?;
    tx.commit()?;

    log::info!(
        "deleted category {} ({} children re-parented, {} transactions reassigned)",
        id,
        reparented_children,
        reassigned_transactions
    );
    Ok(CategoryDeleteResult {
        deleted_id: id,
        reparented_children,
        reassigned_transactions,
    })
}
