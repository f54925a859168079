//! SQLite connection pool and startup migrations.

use crate::config::LedgerConfig;
use crate::error::AppError;
use crate::infra::migrations::{run_migrations, MIGRATIONS};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Pool of connections to the one ledger file. Only [`init_db`] builds
/// one, so holding a `DbPool` means the schema is current.
#[derive(Clone)]
pub struct DbPool {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl DbPool {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn configure_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |r| r.get::<_, String>(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}

/// Open (creating if needed) the database at `config.db_path`, bring the
/// schema up to date and return the pool.
pub fn init_db(config: &LedgerConfig) -> Result<DbPool, AppError> {
    let db_path = config.db_path.as_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            log::error!("cannot create {:?}: {}", parent, e);
            AppError::StorageUnavailable(format!("cannot create directory {:?}", parent))
        })?;
    }

    let busy_timeout = config.busy_timeout;
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(move |conn| configure_connection(conn, busy_timeout));
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(busy_timeout.max(Duration::from_secs(1)))
        .build(manager)?;

    {
        let mut conn = pool.get()?;
        let version = run_migrations(&mut conn, MIGRATIONS)?;
        log::info!("ledger at {:?} is at schema version {}", db_path, version);
    }

    Ok(DbPool {
        pool,
        path: db_path.to_path_buf(),
    })
}

/// Check out a connection for a single operation.
pub fn get_connection(pool: &DbPool) -> Result<DbConn, AppError> {
    Ok(pool.pool.get()?)
}
