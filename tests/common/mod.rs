//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use finsight::app::{
    account_create, transaction_add, AccountCreateReq, AccountDto, TransactionAddReq,
    TransactionDto,
};
use finsight::config::LedgerConfig;
use finsight::domain::AccountType;
use finsight::infra::{init_db, DbPool};
use std::ops::Deref;
use std::path::PathBuf;
use tempfile::TempDir;

/// A migrated ledger in its own temp directory, removed on drop.
pub struct TestDb {
    pub pool: DbPool,
    dir: TempDir,
}

impl TestDb {
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("ledger.db")
    }
}

impl Deref for TestDb {
    type Target = DbPool;

    fn deref(&self) -> &DbPool {
        &self.pool
    }
}

pub fn init_test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let config = LedgerConfig::with_db_path(dir.path().join("ledger.db"));
    let pool = init_db(&config).unwrap();
    TestDb { pool, dir }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_account(pool: &DbPool, name: &str) -> AccountDto {
    account_create(
        pool,
        AccountCreateReq {
            name: name.to_string(),
            account_type: AccountType::Checking,
        },
    )
    .unwrap()
}

pub fn add_req(account_id: i64, amount_cents: i64, on: NaiveDate) -> TransactionAddReq {
    TransactionAddReq {
        account_id,
        category_id: None,
        amount_cents,
        transaction_type: None,
        description: format!("{} cents", amount_cents),
        transaction_date: on,
    }
}

pub fn add_tx(pool: &DbPool, account_id: i64, amount_cents: i64, on: NaiveDate) -> TransactionDto {
    transaction_add(pool, add_req(account_id, amount_cents, on)).unwrap()
}
