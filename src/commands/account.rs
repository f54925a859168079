use crate::app::{
    account_archive, account_create, account_get, account_list, account_rename, AccountCreateReq,
    AccountDto, AccountRenameReq,
};
use crate::commands::Gateway;
use crate::error::AppError;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccountListReq {
    pub include_archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccountIdReq {
    pub account_id: i64,
}

pub fn cmd_account_list(gw: &Gateway, req: AccountListReq) -> Result<Vec<AccountDto>, AppError> {
    account_list(gw.pool(), req.include_archived.unwrap_or(false))
}

pub fn cmd_account_get(gw: &Gateway, req: AccountIdReq) -> Result<AccountDto, AppError> {
    account_get(gw.pool(), req.account_id)
}

pub fn cmd_account_create(gw: &Gateway, req: AccountCreateReq) -> Result<AccountDto, AppError> {
    account_create(gw.pool(), req)
}

pub fn cmd_account_rename(gw: &Gateway, req: AccountRenameReq) -> Result<AccountDto, AppError> {
    account_rename(gw.pool(), req)
}

pub fn cmd_account_archive(gw: &Gateway, req: AccountIdReq) -> Result<AccountDto, AppError> {
    account_archive(gw.pool(), req.account_id)
}
