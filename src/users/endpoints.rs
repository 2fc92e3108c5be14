use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::data::DBConnection;
use crate::internal_error::InternalResult;

use super::data::*;
use super::helpers::*;

#[post("/register", format = "json", data = "<register_request>")]
pub fn register(
    register_request: Json<RegisterRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<RegisterResult>> {
    let mut db_connection = db_connection.lock()?;

    let user_id = register_user_in_db(
        &mut db_connection,
        &register_request.username,
        &register_request.email,
        Utc::now(),
    )?;

    Ok(Json(RegisterResult { user_id }))
}

#[get("/profile/<user_id>")]
pub fn profile(
    user_id: UserID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Profile>> {
    let db_connection = db_connection.lock()?;

    let profile = get_profile_from_db(&db_connection, user_id)?;

    Ok(Json(profile))
}

#[post("/delete_user", format = "json", data = "<delete_user_request>")]
pub fn delete_user(
    delete_user_request: Json<DeleteUserRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let mut db_connection = db_connection.lock()?;

    delete_user_from_db(&mut db_connection, delete_user_request.user_id)?;

    Ok(())
}
