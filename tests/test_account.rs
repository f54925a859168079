//! Account integration tests

mod common;

use common::{init_test_db, make_account};
use finsight::app::{
    account_archive, account_create, account_get, account_list, account_rename, AccountCreateReq,
    AccountRenameReq,
};
use finsight::domain::AccountType;

fn req(name: &str, account_type: AccountType) -> AccountCreateReq {
    AccountCreateReq {
        name: name.to_string(),
        account_type,
    }
}

// ══════════════════════════════════════════════════════════
//  account_create
// ══════════════════════════════════════════════════════════

#[test]
fn create_account_returns_fields() {
    let pool = init_test_db();
    let acct = account_create(&pool, req("Checking", AccountType::Checking)).unwrap();
    assert!(acct.id > 0);
    assert_eq!(acct.name, "Checking");
    assert_eq!(acct.account_type, AccountType::Checking);
    assert!(!acct.archived);
    assert!(!acct.created_at.is_empty());
}

#[test]
fn create_account_trims_name() {
    let pool = init_test_db();
    let acct = account_create(&pool, req("  Rainy Day  ", AccountType::Savings)).unwrap();
    assert_eq!(acct.name, "Rainy Day");
    assert_eq!(acct.account_type, AccountType::Savings);
}

#[test]
fn create_account_empty_name_fails() {
    let pool = init_test_db();
    let err = account_create(&pool, req("   ", AccountType::Checking)).unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
    assert!(account_list(&pool, true).unwrap().is_empty());
}

#[test]
fn create_account_duplicate_name_fails() {
    let pool = init_test_db();
    make_account(&pool, "Checking");
    let err = account_create(&pool, req("Checking", AccountType::Savings)).unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_NAME");
    assert_eq!(account_list(&pool, true).unwrap().len(), 1);
}

#[test]
fn account_names_are_case_sensitive() {
    let pool = init_test_db();
    make_account(&pool, "Checking");
    let other = account_create(&pool, req("checking", AccountType::Checking)).unwrap();
    assert_eq!(other.name, "checking");
}

/// Archiving keeps the name reserved: an archived account's name cannot be
/// reused by a new account.
#[test]
fn archived_account_name_stays_reserved() {
    let pool = init_test_db();
    let acct = make_account(&pool, "Old Savings");
    account_archive(&pool, acct.id).unwrap();
    let err = account_create(&pool, req("Old Savings", AccountType::Savings)).unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_NAME");
}

// ══════════════════════════════════════════════════════════
//  account_get / account_list
// ══════════════════════════════════════════════════════════

#[test]
fn get_account_by_id() {
    let pool = init_test_db();
    let created = make_account(&pool, "Checking");
    assert_eq!(account_get(&pool, created.id).unwrap(), created);
}

#[test]
fn get_account_not_found() {
    let pool = init_test_db();
    let err = account_get(&pool, 4242).unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn list_excludes_archived_by_default() {
    let pool = init_test_db();
    let a = make_account(&pool, "A");
    let b = make_account(&pool, "B");
    account_archive(&pool, a.id).unwrap();

    let active = account_list(&pool, false).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);

    let all = account_list(&pool, true).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|x| x.id == a.id && x.archived));
}

// ══════════════════════════════════════════════════════════
//  account_archive / account_rename
// ══════════════════════════════════════════════════════════

#[test]
fn archive_unknown_account_fails() {
    let pool = init_test_db();
    let err = account_archive(&pool, 77).unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn archive_is_repeatable() {
    let pool = init_test_db();
    let acct = make_account(&pool, "A");
    assert!(account_archive(&pool, acct.id).unwrap().archived);
    assert!(account_archive(&pool, acct.id).unwrap().archived);
}

#[test]
fn rename_account() {
    let pool = init_test_db();
    let acct = make_account(&pool, "Chequing");
    let renamed = account_rename(
        &pool,
        AccountRenameReq {
            account_id: acct.id,
            name: "Checking".into(),
        },
    )
    .unwrap();
    assert_eq!(renamed.name, "Checking");
    assert_eq!(account_get(&pool, acct.id).unwrap().name, "Checking");
}

#[test]
fn rename_to_own_name_is_allowed() {
    let pool = init_test_db();
    let acct = make_account(&pool, "Checking");
    let same = account_rename(
        &pool,
        AccountRenameReq {
            account_id: acct.id,
            name: "Checking".into(),
        },
    )
    .unwrap();
    assert_eq!(same.name, "Checking");
}

#[test]
fn rename_to_taken_name_fails() {
    let pool = init_test_db();
    make_account(&pool, "A");
    let b = make_account(&pool, "B");
    let err = account_rename(
        &pool,
        AccountRenameReq {
            account_id: b.id,
            name: "A".into(),
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_NAME");
}

#[test]
fn rename_unknown_account_fails() {
    let pool = init_test_db();
    let err = account_rename(
        &pool,
        AccountRenameReq {
            account_id: 9,
            name: "X".into(),
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}
