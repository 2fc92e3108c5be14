use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use crate::internal_error::InternalResult;

pub type DBConnection = Arc<Mutex<Connection>>;

pub fn initialize_schema(connection: &Connection) -> InternalResult<()> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (username TEXT NOT NULL, email TEXT NOT NULL UNIQUE, joined_at TEXT NOT NULL)",
        params![],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS categories (user_id INTEGER NOT NULL, name TEXT NOT NULL, is_default INTEGER NOT NULL DEFAULT 0)",
        params![],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            due_date TEXT NOT NULL,
            due_time TEXT NOT NULL,
            priority INTEGER NOT NULL,
            status INTEGER NOT NULL DEFAULT 0,
            progress INTEGER NOT NULL DEFAULT 0,
            track_progress INTEGER NOT NULL DEFAULT 0,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            is_completed INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT,
            created_at TEXT NOT NULL
        )",
        params![],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS subtasks (task_id INTEGER NOT NULL, title TEXT NOT NULL, is_completed INTEGER NOT NULL DEFAULT 0)",
        params![],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS achievements (
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            trophy_level INTEGER NOT NULL,
            earned_at TEXT NOT NULL
        )",
        params![],
    )?;
    // Backstop against concurrent evaluations awarding the same rule twice.
    connection.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS achievement_names ON achievements (user_id, name)",
        params![],
    )?;

    Ok(())
}

#[cfg(test)]
pub fn test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("in-memory database");
    initialize_schema(&connection).expect("schema");
    connection
}
