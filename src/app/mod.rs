//! Ledger use cases. Every write runs in its own immediate transaction.

mod account;
mod balance;
mod category;
mod transaction;

pub use account::{
    account_archive, account_create, account_get, account_list, account_rename, AccountCreateReq,
    AccountDto, AccountRenameReq,
};
pub use balance::{balance_get, balance_running, RunningBalance, RunningBalanceEntry};
pub use category::{
    category_create, category_delete, category_get, category_list, category_update,
    CategoryCreateReq, CategoryDeleteResult, CategoryDto, CategoryUpdateReq,
};
pub(crate) use transaction::update_tracking_account;
pub use transaction::{
    transaction_add, transaction_delete, transaction_get, transaction_list, transaction_update,
    TransactionAddReq, TransactionDto, TransactionListReq, TransactionUpdateReq, MAX_PAGE_SIZE,
};
