use rusqlite::Connection;

use std::error::Error;
use std::sync::{Arc, Mutex};

mod achievements;
mod categories;
mod data;
mod internal_error;
mod stats;
mod tasks;
mod users;

use data::{initialize_schema, DBConnection};

#[macro_use]
extern crate rocket;

use rocket::{Build, Rocket};

fn build_rocket(connection: DBConnection) -> Rocket<Build> {
    rocket::build().manage(connection).mount(
        "/api",
        routes![
            users::endpoints::register,
            users::endpoints::profile,
            users::endpoints::delete_user,
            categories::endpoints::get_categories,
            categories::endpoints::add_category,
            categories::endpoints::delete_category,
            tasks::endpoints::get_tasks,
            tasks::endpoints::get_subtasks,
            tasks::endpoints::add_task,
            tasks::endpoints::set_task,
            tasks::endpoints::delete_task,
            tasks::endpoints::complete_task_endpoint,
            tasks::endpoints::update_progress,
            tasks::endpoints::toggle_subtask_endpoint,
            tasks::endpoints::filter_tasks,
            achievements::endpoints::get_achievements,
            stats::endpoints::progress_stats,
            stats::endpoints::completion_stats,
            stats::endpoints::category_stats,
            stats::endpoints::progress_overview,
        ],
    )
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let database_path = std::env::var("RTASKER_DB").unwrap_or_else(|_| "rtasker.db".to_string());

    let connection = Connection::open(database_path)?;
    initialize_schema(&connection)?;
    let connection = Arc::new(Mutex::new(connection));

    let _ = build_rocket(connection).launch().await?;

    Ok(())
}
