use serde::{Deserialize, Serialize};

use crate::users::data::UserID;

pub type CategoryID = i64;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Category {
    pub name: String,
    pub is_default: bool,
}

#[derive(Deserialize, Debug)]
pub struct AddCategoryRequest {
    pub user_id: UserID,
    pub name: String,
}

#[derive(Serialize, Debug)]
pub struct AddCategoryResult {
    pub category_id: CategoryID,
}

#[derive(Deserialize, Debug)]
pub struct DeleteCategoryRequest {
    pub user_id: UserID,
    pub category_id: CategoryID,
}
