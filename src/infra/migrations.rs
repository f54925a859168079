//! Versioned schema migrations, applied once each and recorded in
//! `schema_migrations`.

use crate::error::AppError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::fmt::Display;

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("../../migrations/0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "add_account_archived",
        sql: include_str!("../../migrations/0002_add_account_archived.sql"),
    },
    Migration {
        version: 3,
        name: "ledger_indexes",
        sql: include_str!("../../migrations/0003_ledger_indexes.sql"),
    },
];

/// Newest version this build knows about.
pub fn latest_version(migrations: &[Migration]) -> i64 {
    migrations.last().map(|m| m.version).unwrap_or(0)
}

/// Versions must be exactly 1, 2, 3, ... in registration order.
pub fn validate_sequence(migrations: &[Migration]) -> Result<(), AppError> {
    for (idx, m) in migrations.iter().enumerate() {
        let expected = idx as i64 + 1;
        if m.version != expected {
            return Err(AppError::MigrationFailure(format!(
                "migration '{}' has version {}, expected {} (gap or duplicate in sequence)",
                m.name, m.version, expected
            )));
        }
    }
    Ok(())
}

/// Persisted schema version; 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<i64, AppError> {
    let has_table: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    if has_table.is_none() {
        return Ok(0);
    }
    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}

fn step_failed(m: &Migration, e: impl Display) -> AppError {
    log::error!("migration {} ({}) failed: {}", m.version, m.name, e);
    AppError::MigrationFailure(format!("step {} ({}) failed: {}", m.version, m.name, e))
}

/// Apply every registered step newer than the persisted version, each in
/// its own immediate transaction. Returns the resulting schema version.
pub fn run_migrations(conn: &mut Connection, migrations: &[Migration]) -> Result<i64, AppError> {
    validate_sequence(migrations)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (version INTEGER PRIMARY KEY, name TEXT NOT NULL, applied_at TEXT NOT NULL)",
        [],
    )
    .map_err(|e| AppError::MigrationFailure(format!("cannot create version table: {}", e)))?;

    let current = schema_version(conn)
        .map_err(|e| AppError::MigrationFailure(format!("cannot read schema version: {}", e)))?;
    let latest = latest_version(migrations);
    if current > latest {
        return Err(AppError::MigrationFailure(format!(
            "database schema version {} is newer than this build supports ({})",
            current, latest
        )));
    }
    if current == latest {
        log::info!("schema up to date at version {}", current);
        return Ok(current);
    }

    for m in migrations.iter().filter(|m| m.version > current) {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| step_failed(m, e))?;

        // Another process may have migrated while we waited for the lock.
        let applied: Option<i64> = tx
            .query_row(
                "SELECT version FROM schema_migrations WHERE version = ?1",
                [m.version],
                |r| r.get(0),
            )
            .optional()
            .map_err(|e| step_failed(m, e))?;
        if applied.is_some() {
            continue;
        }

        tx.execute_batch(m.sql).map_err(|e| step_failed(m, e))?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![m.version, m.name, Utc::now().to_rfc3339()],
        )
        .map_err(|e| step_failed(m, e))?;
        tx.commit().map_err(|e| step_failed(m, e))?;

        log::info!("applied migration {} ({})", m.version, m.name);
    }

    schema_version(conn)
        .map_err(|e| AppError::MigrationFailure(format!("cannot read schema version: {}", e)))
}
