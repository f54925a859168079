//! Command gateway: the typed request/response boundary in front of the
//! ledger.
//!
//! Requests are `{"op": "<name>", "params": {...}}` with camelCase params.
//! Responses are `{"ok": {"kind": ..., "data": ...}}` or
//! `{"error": {"code": ..., "message": ..., "details": null}}`.

pub mod account;
pub mod cache;
pub mod category;
pub mod transaction;

use crate::app::{
    AccountCreateReq, AccountDto, AccountRenameReq, CategoryCreateReq, CategoryDeleteResult,
    CategoryDto, CategoryUpdateReq, RunningBalanceEntry, TransactionDto, TransactionListReq,
    TransactionUpdateReq,
};
use crate::error::{AppError, AppErrorDto};
use crate::infra::DbPool;
use account::{AccountIdReq, AccountListReq};
use cache::BalanceCache;
use category::{CategoryIdReq, CategoryListReq};
use serde::{Deserialize, Serialize};
use transaction::{TransactionAddParams, TransactionIdReq};

/// Every operation the gateway accepts. Unknown ops, missing required
/// params and unknown param fields fail deserialization.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", content = "params", rename_all = "snake_case")]
pub enum Command {
    GetAccounts(AccountListReq),
    GetAccount(AccountIdReq),
    AddAccount(AccountCreateReq),
    RenameAccount(AccountRenameReq),
    ArchiveAccount(AccountIdReq),
    GetBalance(AccountIdReq),
    GetRunningBalance(AccountIdReq),
    GetTransactions(TransactionListReq),
    AddTransaction(TransactionAddParams),
    UpdateTransaction(TransactionUpdateReq),
    DeleteTransaction(TransactionIdReq),
    GetCategories(CategoryListReq),
    AddCategory(CategoryCreateReq),
    UpdateCategory(CategoryUpdateReq),
    DeleteCategory(CategoryIdReq),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetAccounts(_) => "get_accounts",
            Self::GetAccount(_) => "get_account",
            Self::AddAccount(_) => "add_account",
            Self::RenameAccount(_) => "rename_account",
            Self::ArchiveAccount(_) => "archive_account",
            Self::GetBalance(_) => "get_balance",
            Self::GetRunningBalance(_) => "get_running_balance",
            Self::GetTransactions(_) => "get_transactions",
            Self::AddTransaction(_) => "add_transaction",
            Self::UpdateTransaction(_) => "update_transaction",
            Self::DeleteTransaction(_) => "delete_transaction",
            Self::GetCategories(_) => "get_categories",
            Self::AddCategory(_) => "add_category",
            Self::UpdateCategory(_) => "update_category",
            Self::DeleteCategory(_) => "delete_category",
        }
    }

    /// Parse a raw request. A missing `params` is read as `{}` so that
    /// operations without required params can omit it.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mut value: serde_json::Value = serde_json::from_str(raw)?;
        match value.as_object_mut() {
            Some(obj) => {
                obj.entry("params")
                    .or_insert_with(|| serde_json::Value::Object(Default::default()));
            }
            None => {
                return Err(AppError::InvalidInput(
                    "request must be a JSON object".into(),
                ))
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CommandOutput {
    Accounts(Vec<AccountDto>),
    Account(AccountDto),
    Balance(i64),
    RunningBalance(Vec<RunningBalanceEntry>),
    Transactions(Vec<TransactionDto>),
    Transaction(TransactionDto),
    TransactionDeleted(TransactionDto),
    Categories(Vec<CategoryDto>),
    Category(CategoryDto),
    CategoryDeleted(CategoryDeleteResult),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandResponse {
    Ok(CommandOutput),
    Error(AppErrorDto),
}

impl From<Result<CommandOutput, AppError>> for CommandResponse {
    fn from(result: Result<CommandOutput, AppError>) -> Self {
        match result {
            Ok(out) => CommandResponse::Ok(out),
            Err(e) => CommandResponse::Error(e.to_serde()),
        }
    }
}

/// Owns the pool and the balance cache. Shareable across threads.
pub struct Gateway {
    pool: DbPool,
    balances: BalanceCache,
}

impl Gateway {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            balances: BalanceCache::new(),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn balances(&self) -> &BalanceCache {
        &self.balances
    }

    pub fn dispatch(&self, command: Command) -> Result<CommandOutput, AppError> {
        let op = command.name();
        let result = match command {
            Command::GetAccounts(req) => {
                account::cmd_account_list(self, req).map(CommandOutput::Accounts)
            }
            Command::GetAccount(req) => account::cmd_account_get(self, req).map(CommandOutput::Account),
            Command::AddAccount(req) => {
                account::cmd_account_create(self, req).map(CommandOutput::Account)
            }
            Command::RenameAccount(req) => {
                account::cmd_account_rename(self, req).map(CommandOutput::Account)
            }
            Command::ArchiveAccount(req) => {
                account::cmd_account_archive(self, req).map(CommandOutput::Account)
            }
            Command::GetBalance(req) => {
                transaction::cmd_balance_get(self, req).map(CommandOutput::Balance)
            }
            Command::GetRunningBalance(req) => {
                transaction::cmd_balance_running(self, req).map(CommandOutput::RunningBalance)
            }
            Command::GetTransactions(req) => {
                transaction::cmd_transaction_list(self, req).map(CommandOutput::Transactions)
            }
            Command::AddTransaction(req) => {
                transaction::cmd_transaction_add(self, req).map(CommandOutput::Transaction)
            }
            Command::UpdateTransaction(req) => {
                transaction::cmd_transaction_update(self, req).map(CommandOutput::Transaction)
            }
            Command::DeleteTransaction(req) => {
                transaction::cmd_transaction_delete(self, req)
                    .map(CommandOutput::TransactionDeleted)
            }
            Command::GetCategories(req) => {
                category::cmd_category_list(self, req).map(CommandOutput::Categories)
            }
            Command::AddCategory(req) => {
                category::cmd_category_create(self, req).map(CommandOutput::Category)
            }
            Command::UpdateCategory(req) => {
                category::cmd_category_update(self, req).map(CommandOutput::Category)
            }
            Command::DeleteCategory(req) => {
                category::cmd_category_delete(self, req).map(CommandOutput::CategoryDeleted)
            }
        };
        if let Err(ref e) = result {
            log::warn!("{} failed: {} ({})", op, e, e.code());
        }
        result
    }

    /// One JSON request in, one JSON response out. Never fails: parse and
    /// ledger errors both come back as an `error` response.
    pub fn dispatch_json(&self, raw: &str) -> String {
        let response: CommandResponse = Command::parse(raw)
            .and_then(|command| self.dispatch(command))
            .into();
        serde_json::to_string(&response).unwrap_or_else(|e| {
            log::error!("cannot serialize response: {}", e);
            r#"{"error":{"code":"STORAGE_UNAVAILABLE","message":"Storage unavailable: response could not be encoded","details":null}}"#.to_string()
        })
    }
}
