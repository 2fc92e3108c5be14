use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::data::DBConnection;
use crate::internal_error::InternalResult;
use crate::users::data::UserID;

use super::data::*;
use super::helpers::*;

#[get("/get_categories/<user_id>")]
pub fn get_categories(
    user_id: UserID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Vec<(CategoryID, Category)>>> {
    let db_connection = db_connection.lock()?;

    let categories = get_categories_from_db(&db_connection, user_id)?;

    Ok(Json(categories))
}

#[post("/add_category", format = "json", data = "<add_category_request>")]
pub fn add_category(
    add_category_request: Json<AddCategoryRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<AddCategoryResult>> {
    let db_connection = db_connection.lock()?;

    let category_id = add_category_to_db(
        &db_connection,
        add_category_request.user_id,
        &add_category_request.name,
        false,
    )?;

    Ok(Json(AddCategoryResult { category_id }))
}

#[post("/delete_category", format = "json", data = "<delete_category_request>")]
pub fn delete_category(
    delete_category_request: Json<DeleteCategoryRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let mut db_connection = db_connection.lock()?;

    delete_category_from_db(
        &mut db_connection,
        delete_category_request.user_id,
        delete_category_request.category_id,
    )?;

    Ok(())
}
