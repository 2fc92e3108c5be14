use rocket::serde::json::Json;
use rocket::{get, State};

use crate::data::DBConnection;
use crate::internal_error::InternalResult;
use crate::users::data::UserID;

use super::data::*;
use super::helpers::*;

#[get("/get_achievements/<user_id>")]
pub fn get_achievements(
    user_id: UserID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<AchievementSummary>> {
    let db_connection = db_connection.lock()?;

    let summary = get_achievement_summary(&db_connection, user_id)?;

    Ok(Json(summary))
}
