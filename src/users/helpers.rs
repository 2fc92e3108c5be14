use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::internal_error::{InternalError, InternalResult};

use super::data::*;

pub fn register_user_in_db(
    db_connection: &mut Connection,
    username: &str,
    email: &str,
    now: DateTime<Utc>,
) -> InternalResult<UserID> {
    if username.trim().is_empty() || email.trim().is_empty() {
        return Err(InternalError::from("username and email are required"));
    }

    let existing: Option<i64> = db_connection
        .query_row(
            "SELECT rowid FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(InternalError::from("email already registered"));
    }

    let tx = db_connection.transaction()?;

    tx.execute(
        "INSERT INTO users (username, email, joined_at) VALUES (?1, ?2, ?3)",
        params![username, email, now.to_rfc3339()],
    )?;
    let user_id = tx.last_insert_rowid();

    crate::categories::helpers::seed_default_categories(&tx, user_id)?;

    tx.commit()?;

    log::info!("registered user {}", username);

    Ok(user_id)
}

pub fn get_user_from_db(db_connection: &Connection, user_id: UserID) -> InternalResult<User> {
    let user = db_connection.query_row(
        "SELECT username, email, joined_at FROM users WHERE rowid = ?1",
        params![user_id],
        |row| {
            Ok(User {
                username: row.get(0)?,
                email: row.get(1)?,
                joined_at: row.get(2)?,
            })
        },
    )?;

    Ok(user)
}

pub fn get_profile_from_db(db_connection: &Connection, user_id: UserID) -> InternalResult<Profile> {
    let user = get_user_from_db(db_connection, user_id)?;

    let count = |query: &str| -> InternalResult<i64> {
        Ok(db_connection.query_row(query, params![user_id], |row| row.get(0))?)
    };

    Ok(Profile {
        username: user.username,
        tasks_count: count("SELECT COUNT(*) FROM tasks WHERE user_id = ?1")?,
        completed_count: count("SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND is_completed = 1")?,
        achievements_count: count("SELECT COUNT(*) FROM achievements WHERE user_id = ?1")?,
        categories_count: count("SELECT COUNT(*) FROM categories WHERE user_id = ?1")?,
        recent_achievements: crate::achievements::helpers::get_recent_achievements(
            db_connection,
            user_id,
            3,
        )?,
    })
}

/// Removes the user and everything they own in one transaction.
pub fn delete_user_from_db(db_connection: &mut Connection, user_id: UserID) -> InternalResult<()> {
    let tx = db_connection.transaction()?;

    get_user_from_db(&tx, user_id)?;

    tx.execute(
        "DELETE FROM subtasks WHERE task_id IN (SELECT rowid FROM tasks WHERE user_id = ?1)",
        params![user_id],
    )?;
    tx.execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])?;
    tx.execute("DELETE FROM categories WHERE user_id = ?1", params![user_id])?;
    tx.execute("DELETE FROM achievements WHERE user_id = ?1", params![user_id])?;
    tx.execute("DELETE FROM users WHERE rowid = ?1", params![user_id])?;

    tx.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_connection;
    use chrono::TimeZone;

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn duplicate_emails_are_rejected() {
        let mut db_connection = test_connection();
        register_user_in_db(&mut db_connection, "erin", "erin@example.com", test_now()).unwrap();

        let result = register_user_in_db(&mut db_connection, "other", "erin@example.com", test_now());
        assert!(result.is_err());
    }

    #[test]
    fn deleting_a_user_leaves_no_orphans() {
        let mut db_connection = test_connection();
        let user_id =
            register_user_in_db(&mut db_connection, "erin", "erin@example.com", test_now()).unwrap();
        let categories =
            crate::categories::helpers::get_categories_from_db(&db_connection, user_id).unwrap();

        let task_id = crate::tasks::helpers::add_task_to_db(
            &mut db_connection,
            &crate::tasks::data::AddTaskRequest {
                user_id,
                category_id: categories[0].0,
                title: "report".to_string(),
                description: "write it".to_string(),
                due_date: "2024-01-10".to_string(),
                due_time: "17:00".to_string(),
                priority: crate::tasks::data::Priority::High,
                is_recurring: false,
                track_progress: false,
                subtasks: vec![crate::tasks::data::SubTask {
                    title: "outline".to_string(),
                    is_completed: false,
                }],
            },
            test_now(),
        )
        .unwrap();
        crate::tasks::helpers::complete_task(&mut db_connection, user_id, task_id, test_now())
            .unwrap();

        delete_user_from_db(&mut db_connection, user_id).unwrap();

        for table in ["users", "categories", "tasks", "subtasks", "achievements"] {
            let rows: i64 = db_connection
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                .unwrap();
            assert_eq!(rows, 0, "{} not emptied", table);
        }
    }

    #[test]
    fn profile_counts_reflect_store_state() {
        let mut db_connection = test_connection();
        let user_id =
            register_user_in_db(&mut db_connection, "erin", "erin@example.com", test_now()).unwrap();

        let profile = get_profile_from_db(&db_connection, user_id).unwrap();
        assert_eq!(profile.username, "erin");
        assert_eq!(profile.tasks_count, 0);
        assert_eq!(profile.categories_count, 2);
        assert!(profile.recent_achievements.is_empty());
    }
}
