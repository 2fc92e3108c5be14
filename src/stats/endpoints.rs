use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, State};

use crate::data::DBConnection;
use crate::internal_error::InternalResult;
use crate::users::data::UserID;

use super::data::*;
use super::helpers::*;

#[get("/progress_stats/<user_id>")]
pub fn progress_stats(
    user_id: UserID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<ProgressStats>> {
    let db_connection = db_connection.lock()?;

    let stats = get_progress_stats(&db_connection, user_id)?;

    Ok(Json(stats))
}

#[get("/completion_stats/<user_id>")]
pub fn completion_stats(
    user_id: UserID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<CompletionStats>> {
    let db_connection = db_connection.lock()?;

    let stats = get_completion_stats(&db_connection, user_id, Utc::now())?;

    Ok(Json(stats))
}

#[get("/category_stats/<user_id>")]
pub fn category_stats(
    user_id: UserID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Vec<CategoryStats>>> {
    let db_connection = db_connection.lock()?;

    let stats = get_category_stats(&db_connection, user_id)?;

    Ok(Json(stats))
}

#[get("/progress_overview/<user_id>")]
pub fn progress_overview(
    user_id: UserID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<ProgressOverview>> {
    let db_connection = db_connection.lock()?;

    let overview = get_progress_overview(&db_connection, user_id)?;

    Ok(Json(overview))
}
