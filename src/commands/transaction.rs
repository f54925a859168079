use crate::app::{
    balance_get, balance_running, transaction_add, transaction_delete, transaction_list,
    update_tracking_account, RunningBalanceEntry, TransactionAddReq, TransactionDto,
    TransactionListReq, TransactionUpdateReq,
};
use crate::commands::account::AccountIdReq;
use crate::commands::Gateway;
use crate::domain::TransactionKind;
use crate::error::AppError;
use chrono::NaiveDate;
use serde::Deserialize;

/// Boundary form of an add: the debit/credit label is mandatory here and
/// must agree with the amount's sign.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionAddParams {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount_cents: i64,
    pub transaction_type: TransactionKind,
    pub description: String,
    pub transaction_date: NaiveDate,
}

impl From<TransactionAddParams> for TransactionAddReq {
    fn from(p: TransactionAddParams) -> Self {
        TransactionAddReq {
            account_id: p.account_id,
            category_id: p.category_id,
            amount_cents: p.amount_cents,
            transaction_type: Some(p.transaction_type),
            description: p.description,
            transaction_date: p.transaction_date,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionIdReq {
    pub transaction_id: i64,
}

pub fn cmd_transaction_list(
    gw: &Gateway,
    req: TransactionListReq,
) -> Result<Vec<TransactionDto>, AppError> {
    transaction_list(gw.pool(), req)
}

pub fn cmd_transaction_add(
    gw: &Gateway,
    req: TransactionAddParams,
) -> Result<TransactionDto, AppError> {
    gw.balances().mutate(|| {
        let created = transaction_add(gw.pool(), req.into())?;
        let touched = vec![created.account_id];
        Ok((created, touched))
    })
}

pub fn cmd_transaction_update(
    gw: &Gateway,
    req: TransactionUpdateReq,
) -> Result<TransactionDto, AppError> {
    gw.balances().mutate(|| {
        let (previous_account, updated) = update_tracking_account(gw.pool(), req)?;
        let touched = vec![previous_account, updated.account_id];
        Ok((updated, touched))
    })
}

pub fn cmd_transaction_delete(
    gw: &Gateway,
    req: TransactionIdReq,
) -> Result<TransactionDto, AppError> {
    gw.balances().mutate(|| {
        let removed = transaction_delete(gw.pool(), req.transaction_id)?;
        let touched = vec![removed.account_id];
        Ok((removed, touched))
    })
}

pub fn cmd_balance_get(gw: &Gateway, req: AccountIdReq) -> Result<i64, AppError> {
    gw.balances()
        .get_or_load(req.account_id, || balance_get(gw.pool(), req.account_id))
}

pub fn cmd_balance_running(
    gw: &Gateway,
    req: AccountIdReq,
) -> Result<Vec<RunningBalanceEntry>, AppError> {
    balance_running(gw.pool(), req.account_id)?.collect()
}
