use crate::app::{
    category_create, category_delete, category_list, category_update, CategoryCreateReq,
    CategoryDeleteResult, CategoryDto, CategoryUpdateReq,
};
use crate::commands::Gateway;
use crate::error::AppError;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryListReq {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CategoryIdReq {
    pub category_id: i64,
}

pub fn cmd_category_list(gw: &Gateway, _req: CategoryListReq) -> Result<Vec<CategoryDto>, AppError> {
    category_list(gw.pool())
}

pub fn cmd_category_create(gw: &Gateway, req: CategoryCreateReq) -> Result<CategoryDto, AppError> {
    category_create(gw.pool(), req)
}

pub fn cmd_category_update(gw: &Gateway, req: CategoryUpdateReq) -> Result<CategoryDto, AppError> {
    category_update(gw.pool(), req)
}

/// Moving transactions between categories leaves every balance as it was,
/// so the balance cache is not touched.
pub fn cmd_category_delete(
    gw: &Gateway,
    req: CategoryIdReq,
) -> Result<CategoryDeleteResult, AppError> {
    category_delete(gw.pool(), req.category_id)
}
