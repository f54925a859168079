//! Infrastructure: SQLite connection pool and migrations.

pub mod db;
pub mod migrations;

pub(crate) use db::get_connection;
pub use db::{init_db, DbConn, DbPool};
