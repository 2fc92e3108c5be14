use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::data::DBConnection;
use crate::internal_error::InternalResult;
use crate::users::data::UserID;

use super::data::*;
use super::helpers::*;

#[get("/get_tasks/<user_id>")]
pub fn get_tasks(
    user_id: UserID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<TaskListResponse>> {
    let db_connection = db_connection.lock()?;

    let tasks = get_active_tasks(&db_connection, user_id)?;

    Ok(Json(classify_by_due_date(tasks, Utc::now().date_naive())))
}

#[get("/get_subtasks/<user_id>/<task_id>")]
pub fn get_subtasks(
    user_id: UserID,
    task_id: TaskID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Vec<(SubTaskID, SubTask)>>> {
    let db_connection = db_connection.lock()?;

    get_task_from_db(&db_connection, user_id, task_id)?;
    let subtasks = get_subtasks_from_db(&db_connection, task_id)?;

    Ok(Json(subtasks))
}

#[post("/add_task", format = "json", data = "<add_task_request>")]
pub fn add_task(
    add_task_request: Json<AddTaskRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<AddTaskResult>> {
    let mut db_connection = db_connection.lock()?;

    let task_id = add_task_to_db(&mut db_connection, &add_task_request, Utc::now())?;

    Ok(Json(AddTaskResult { task_id }))
}

#[post("/set_task", format = "json", data = "<set_task_request>")]
pub fn set_task(
    set_task_request: Json<SetTaskRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let mut db_connection = db_connection.lock()?;

    update_task_in_db(&mut db_connection, &set_task_request)?;

    Ok(())
}

#[post("/delete_task", format = "json", data = "<delete_task_request>")]
pub fn delete_task(
    delete_task_request: Json<DeleteTaskRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let mut db_connection = db_connection.lock()?;

    delete_task_from_db(
        &mut db_connection,
        delete_task_request.user_id,
        delete_task_request.task_id,
    )?;

    Ok(())
}

#[post("/complete_task", format = "json", data = "<complete_task_request>")]
pub fn complete_task_endpoint(
    complete_task_request: Json<CompleteTaskRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<CompleteTaskResult>> {
    let mut db_connection = db_connection.lock()?;

    let result = complete_task(
        &mut db_connection,
        complete_task_request.user_id,
        complete_task_request.task_id,
        Utc::now(),
    )?;

    Ok(Json(result))
}

#[post("/update_progress", format = "json", data = "<update_progress_request>")]
pub fn update_progress(
    update_progress_request: Json<UpdateProgressRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<UpdateProgressResult>> {
    let db_connection = db_connection.lock()?;

    let result = set_progress(
        &db_connection,
        update_progress_request.user_id,
        update_progress_request.task_id,
        update_progress_request.progress,
    )?;

    Ok(Json(result))
}

#[post("/toggle_subtask", format = "json", data = "<toggle_subtask_request>")]
pub fn toggle_subtask_endpoint(
    toggle_subtask_request: Json<ToggleSubTaskRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<ToggleSubTaskResult>> {
    let db_connection = db_connection.lock()?;

    let result = toggle_subtask(&db_connection, &toggle_subtask_request)?;

    Ok(Json(result))
}

#[post("/filter_tasks", format = "json", data = "<filter_tasks_request>")]
pub fn filter_tasks(
    filter_tasks_request: Json<FilterTasksRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Vec<(TaskID, Task)>>> {
    let db_connection = db_connection.lock()?;

    let tasks = filter_tasks_from_db(
        &db_connection,
        &filter_tasks_request,
        Utc::now().date_naive(),
    )?;

    Ok(Json(tasks))
}
