use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, Row, ToSql};

use crate::achievements::helpers::evaluate_achievements;
use crate::internal_error::{InternalError, InternalResult};
use crate::users::data::UserID;

use super::data::*;

pub const TASK_COLUMNS: &str = "rowid, user_id, category_id, title, description, due_date, due_time, \
     priority, status, progress, track_progress, is_recurring, is_completed, completed_at";

pub fn task_from_row(row: &Row) -> rusqlite::Result<(TaskID, Task)> {
    Ok((
        row.get(0)?,
        Task {
            user_id: row.get(1)?,
            category_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            due_date: row.get(5)?,
            due_time: row.get(6)?,
            priority: row.get(7)?,
            status: row.get(8)?,
            progress: row.get(9)?,
            track_progress: row.get(10)?,
            is_recurring: row.get(11)?,
            is_completed: row.get(12)?,
            completed_at: row.get(13)?,
        },
    ))
}

pub fn get_task_from_db(
    db_connection: &Connection,
    user_id: UserID,
    task_id: TaskID,
) -> InternalResult<Task> {
    let task = db_connection.query_row(
        &format!(
            "SELECT {} FROM tasks WHERE rowid = ?1 AND user_id = ?2",
            TASK_COLUMNS
        ),
        params![task_id, user_id],
        |row| task_from_row(row).map(|(_, task)| task),
    )?;

    Ok(task)
}

pub fn get_subtasks_from_db(
    db_connection: &Connection,
    task_id: TaskID,
) -> InternalResult<Vec<(SubTaskID, SubTask)>> {
    let mut statement = db_connection
        .prepare("SELECT rowid, title, is_completed FROM subtasks WHERE task_id = ?1")?;

    let rows = statement.query_map(params![task_id], |row| {
        Ok((
            row.get(0)?,
            SubTask {
                title: row.get(1)?,
                is_completed: row.get(2)?,
            },
        ))
    })?;

    let mut subtasks = vec![];
    for row_result in rows {
        subtasks.push(row_result?);
    }

    Ok(subtasks)
}

fn validate_due_fields(due_date: &str, due_time: &str) -> InternalResult<()> {
    NaiveDate::parse_from_str(due_date, "%Y-%m-%d")
        .map_err(|_| InternalError::from("invalid due_date, expected YYYY-MM-DD"))?;
    NaiveTime::parse_from_str(due_time, "%H:%M")
        .map_err(|_| InternalError::from("invalid due_time, expected HH:MM"))?;

    Ok(())
}

fn insert_subtasks(
    db_connection: &Connection,
    task_id: TaskID,
    subtasks: &[SubTask],
) -> InternalResult<usize> {
    let mut inserted = 0;
    for subtask in subtasks {
        // Blank rows come from empty form entries; drop them.
        if subtask.title.trim().is_empty() {
            continue;
        }

        db_connection.execute(
            "INSERT INTO subtasks (task_id, title, is_completed) VALUES (?1, ?2, ?3)",
            params![task_id, subtask.title, subtask.is_completed],
        )?;
        inserted += 1;
    }

    Ok(inserted)
}

pub fn add_task_to_db(
    db_connection: &mut Connection,
    request: &AddTaskRequest,
    now: DateTime<Utc>,
) -> InternalResult<TaskID> {
    validate_due_fields(&request.due_date, &request.due_time)?;

    let tx = db_connection.transaction()?;

    crate::categories::helpers::get_category_from_db(&tx, request.user_id, request.category_id)?;

    tx.execute(
        "INSERT INTO tasks (user_id, category_id, title, description, due_date, due_time, \
         priority, status, progress, track_progress, is_recurring, is_completed, completed_at, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, 0, NULL, ?11)",
        params![
            request.user_id,
            request.category_id,
            request.title,
            request.description,
            request.due_date,
            request.due_time,
            request.priority,
            Status::NotStarted,
            request.track_progress,
            request.is_recurring,
            now.to_rfc3339(),
        ],
    )?;
    let task_id = tx.last_insert_rowid();

    if insert_subtasks(&tx, task_id, &request.subtasks)? > 0 {
        update_progress_from_subtasks(&tx, task_id)?;
    }

    tx.commit()?;

    Ok(task_id)
}

pub fn update_task_in_db(
    db_connection: &mut Connection,
    request: &SetTaskRequest,
) -> InternalResult<()> {
    validate_due_fields(&request.due_date, &request.due_time)?;

    let tx = db_connection.transaction()?;

    let task = get_task_from_db(&tx, request.user_id, request.task_id)?;
    crate::categories::helpers::get_category_from_db(&tx, request.user_id, request.category_id)?;

    tx.execute(
        "UPDATE tasks SET category_id = ?1, title = ?2, description = ?3, due_date = ?4, \
         due_time = ?5, priority = ?6, is_recurring = ?7, track_progress = ?8 WHERE rowid = ?9",
        params![
            request.category_id,
            request.title,
            request.description,
            request.due_date,
            request.due_time,
            request.priority,
            request.is_recurring,
            request.track_progress,
            request.task_id,
        ],
    )?;

    // Subtasks are replaced wholesale on every edit.
    tx.execute(
        "DELETE FROM subtasks WHERE task_id = ?1",
        params![request.task_id],
    )?;

    if insert_subtasks(&tx, request.task_id, &request.subtasks)? > 0 {
        update_progress_from_subtasks(&tx, request.task_id)?;
    } else {
        let progress = if task.is_completed { 100 } else { 0 };
        tx.execute(
            "UPDATE tasks SET progress = ?1 WHERE rowid = ?2",
            params![progress, request.task_id],
        )?;
    }

    tx.commit()?;

    Ok(())
}

pub fn delete_task_from_db(
    db_connection: &mut Connection,
    user_id: UserID,
    task_id: TaskID,
) -> InternalResult<()> {
    let tx = db_connection.transaction()?;

    get_task_from_db(&tx, user_id, task_id)?;

    tx.execute("DELETE FROM subtasks WHERE task_id = ?1", params![task_id])?;
    tx.execute("DELETE FROM tasks WHERE rowid = ?1", params![task_id])?;

    tx.commit()?;

    Ok(())
}

pub fn progress_from_subtasks(completed: i64, total: i64) -> i64 {
    if total == 0 {
        0
    } else {
        completed * 100 / total
    }
}

pub fn progress_from_status(status: Status) -> i64 {
    match status {
        Status::NotStarted => 0,
        Status::InProgress => 50,
        Status::Completed => 100,
    }
}

/// Recomputes `progress` from stored subtask state and persists it. With no
/// subtasks, progress falls back to the coarse status mapping. `status` is
/// never written here; only the direct progress-update path derives status
/// from progress.
pub fn update_progress_from_subtasks(
    db_connection: &Connection,
    task_id: TaskID,
) -> InternalResult<i64> {
    let total: i64 = db_connection.query_row(
        "SELECT COUNT(*) FROM subtasks WHERE task_id = ?1",
        params![task_id],
        |row| row.get(0),
    )?;

    let progress = if total > 0 {
        let completed: i64 = db_connection.query_row(
            "SELECT COUNT(*) FROM subtasks WHERE task_id = ?1 AND is_completed = 1",
            params![task_id],
            |row| row.get(0),
        )?;

        progress_from_subtasks(completed, total)
    } else {
        let status: Status = db_connection.query_row(
            "SELECT status FROM tasks WHERE rowid = ?1",
            params![task_id],
            |row| row.get(0),
        )?;

        progress_from_status(status)
    };

    db_connection.execute(
        "UPDATE tasks SET progress = ?1 WHERE rowid = ?2",
        params![progress, task_id],
    )?;

    Ok(progress)
}

pub fn set_progress(
    db_connection: &Connection,
    user_id: UserID,
    task_id: TaskID,
    progress: i64,
) -> InternalResult<UpdateProgressResult> {
    if !(0..=100).contains(&progress) {
        return Err(InternalError::from("progress out of range"));
    }

    get_task_from_db(db_connection, user_id, task_id)?;

    let status = Status::from_progress(progress);
    db_connection.execute(
        "UPDATE tasks SET progress = ?1, status = ?2 WHERE rowid = ?3",
        params![progress, status, task_id],
    )?;

    Ok(UpdateProgressResult { progress, status })
}

pub fn toggle_subtask(
    db_connection: &Connection,
    request: &ToggleSubTaskRequest,
) -> InternalResult<ToggleSubTaskResult> {
    get_task_from_db(db_connection, request.user_id, request.task_id)?;

    let is_completed: bool = db_connection.query_row(
        "SELECT is_completed FROM subtasks WHERE rowid = ?1 AND task_id = ?2",
        params![request.subtask_id, request.task_id],
        |row| row.get(0),
    )?;

    db_connection.execute(
        "UPDATE subtasks SET is_completed = ?1 WHERE rowid = ?2",
        params![!is_completed, request.subtask_id],
    )?;

    let task_progress = update_progress_from_subtasks(db_connection, request.task_id)?;

    Ok(ToggleSubTaskResult {
        subtask_completed: !is_completed,
        task_progress,
    })
}

/// Marks a task completed inside one transaction: an optional recurring
/// clone due tomorrow, the completion mutation itself, subtask completion,
/// then achievement evaluation for the owner.
pub fn complete_task(
    db_connection: &mut Connection,
    user_id: UserID,
    task_id: TaskID,
    now: DateTime<Utc>,
) -> InternalResult<CompleteTaskResult> {
    let tx = db_connection.transaction()?;

    let task = get_task_from_db(&tx, user_id, task_id)?;

    let recurring_task_id = if task.is_recurring {
        let due_date = (now.date_naive() + Duration::days(1)).to_string();
        tx.execute(
            "INSERT INTO tasks (user_id, category_id, title, description, due_date, due_time, \
             priority, status, progress, track_progress, is_recurring, is_completed, completed_at, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, 1, 0, NULL, ?10)",
            params![
                user_id,
                task.category_id,
                task.title,
                task.description,
                due_date,
                task.due_time,
                task.priority,
                Status::NotStarted,
                task.track_progress,
                now.to_rfc3339(),
            ],
        )?;
        let clone_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO subtasks (task_id, title, is_completed) \
             SELECT ?1, title, 0 FROM subtasks WHERE task_id = ?2",
            params![clone_id, task_id],
        )?;

        Some(clone_id)
    } else {
        None
    };

    tx.execute(
        "UPDATE tasks SET is_completed = 1, status = ?1, progress = 100, completed_at = ?2 \
         WHERE rowid = ?3",
        params![Status::Completed, now.to_rfc3339(), task_id],
    )?;
    tx.execute(
        "UPDATE subtasks SET is_completed = 1 WHERE task_id = ?1",
        params![task_id],
    )?;

    let new_achievements = evaluate_achievements(&tx, user_id, now)?;

    tx.commit()?;

    Ok(CompleteTaskResult {
        new_achievements,
        recurring_task_id,
    })
}

pub fn get_active_tasks(
    db_connection: &Connection,
    user_id: UserID,
) -> InternalResult<Vec<(TaskID, Task)>> {
    let mut statement = db_connection.prepare(&format!(
        "SELECT {} FROM tasks WHERE user_id = ?1 AND is_completed = 0 ORDER BY due_date, due_time",
        TASK_COLUMNS
    ))?;

    let rows = statement.query_map(params![user_id], task_from_row)?;

    let mut tasks = vec![];
    for row_result in rows {
        tasks.push(row_result?);
    }

    Ok(tasks)
}

pub fn classify_by_due_date(tasks: Vec<(TaskID, Task)>, today: NaiveDate) -> TaskListResponse {
    let today = today.to_string();

    let mut response = TaskListResponse {
        today: vec![],
        upcoming: vec![],
        overdue: vec![],
    };

    for (task_id, task) in tasks {
        if task.due_date == today {
            response.today.push((task_id, task));
        } else if task.due_date > today {
            response.upcoming.push((task_id, task));
        } else {
            response.overdue.push((task_id, task));
        }
    }

    response
}

pub fn filter_tasks_from_db(
    db_connection: &Connection,
    request: &FilterTasksRequest,
    today: NaiveDate,
) -> InternalResult<Vec<(TaskID, Task)>> {
    let mut query = format!(
        "SELECT {} FROM tasks WHERE user_id = ?1 AND is_completed = 0",
        TASK_COLUMNS
    );
    let mut parameters: Vec<Box<dyn ToSql>> = vec![Box::new(request.user_id)];

    if let Some(category_id) = request.category_id {
        parameters.push(Box::new(category_id));
        query.push_str(&format!(" AND category_id = ?{}", parameters.len()));
    }

    if let Some(priority) = request.priority {
        parameters.push(Box::new(priority));
        query.push_str(&format!(" AND priority = ?{}", parameters.len()));
    }

    if let Some(due) = request.due {
        // ISO dates compare correctly as text.
        let comparison = match due {
            DueFilter::Today => "=",
            DueFilter::Upcoming => ">",
            DueFilter::Overdue => "<",
        };
        parameters.push(Box::new(today.to_string()));
        query.push_str(&format!(" AND due_date {} ?{}", comparison, parameters.len()));
    }

    query.push_str(" ORDER BY due_date, due_time");

    let mut statement = db_connection.prepare(&query)?;
    let parameter_refs: Vec<&dyn ToSql> = parameters.iter().map(|p| p.as_ref()).collect();
    let rows = statement.query_map(&parameter_refs[..], task_from_row)?;

    let mut tasks = vec![];
    for row_result in rows {
        tasks.push(row_result?);
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_connection;
    use crate::tasks::data::{Priority, Status, SubTask};
    use chrono::TimeZone;

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    fn seeded_user(db_connection: &mut Connection) -> (UserID, crate::categories::data::CategoryID) {
        let user_id = crate::users::helpers::register_user_in_db(
            db_connection,
            "erin",
            "erin@example.com",
            test_now(),
        )
        .unwrap();
        let categories =
            crate::categories::helpers::get_categories_from_db(db_connection, user_id).unwrap();

        (user_id, categories[0].0)
    }

    fn task_request(
        user_id: UserID,
        category_id: crate::categories::data::CategoryID,
        subtasks: Vec<SubTask>,
    ) -> AddTaskRequest {
        AddTaskRequest {
            user_id,
            category_id,
            title: "write report".to_string(),
            description: "quarterly status report".to_string(),
            due_date: "2024-01-10".to_string(),
            due_time: "17:00".to_string(),
            priority: Priority::Medium,
            is_recurring: false,
            track_progress: false,
            subtasks,
        }
    }

    fn subtask(title: &str, is_completed: bool) -> SubTask {
        SubTask {
            title: title.to_string(),
            is_completed,
        }
    }

    #[test]
    fn progress_truncates_instead_of_rounding() {
        assert_eq!(progress_from_subtasks(1, 4), 25);
        assert_eq!(progress_from_subtasks(3, 4), 75);
        assert_eq!(progress_from_subtasks(1, 3), 33);
        assert_eq!(progress_from_subtasks(0, 0), 0);
    }

    #[test]
    fn progress_falls_back_to_status_without_subtasks() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);

        let task_id =
            add_task_to_db(&mut db_connection, &task_request(user_id, category_id, vec![]), test_now())
                .unwrap();
        db_connection
            .execute(
                "UPDATE tasks SET status = ?1 WHERE rowid = ?2",
                params![Status::InProgress, task_id],
            )
            .unwrap();

        let progress = update_progress_from_subtasks(&db_connection, task_id).unwrap();
        assert_eq!(progress, 50);
    }

    #[test]
    fn subtask_progress_leaves_status_alone() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);

        let subtasks = vec![
            subtask("a", true),
            subtask("b", true),
            subtask("c", true),
            subtask("d", false),
            subtask("e", false),
        ];
        let task_id = add_task_to_db(
            &mut db_connection,
            &task_request(user_id, category_id, subtasks),
            test_now(),
        )
        .unwrap();

        let task = get_task_from_db(&db_connection, user_id, task_id).unwrap();
        assert_eq!(task.progress, 60);
        assert_eq!(task.status, Status::NotStarted);
    }

    #[test]
    fn direct_progress_update_derives_status() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);
        let task_id =
            add_task_to_db(&mut db_connection, &task_request(user_id, category_id, vec![]), test_now())
                .unwrap();

        let result = set_progress(&db_connection, user_id, task_id, 40).unwrap();
        assert_eq!(result.status, Status::InProgress);

        let result = set_progress(&db_connection, user_id, task_id, 0).unwrap();
        assert_eq!(result.status, Status::NotStarted);

        let result = set_progress(&db_connection, user_id, task_id, 100).unwrap();
        assert_eq!(result.status, Status::Completed);

        assert!(set_progress(&db_connection, user_id, task_id, 101).is_err());
    }

    #[test]
    fn toggling_subtasks_recomputes_progress() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);

        let subtasks = vec![subtask("a", false), subtask("b", false)];
        let task_id = add_task_to_db(
            &mut db_connection,
            &task_request(user_id, category_id, subtasks),
            test_now(),
        )
        .unwrap();
        let stored = get_subtasks_from_db(&db_connection, task_id).unwrap();

        let result = toggle_subtask(
            &db_connection,
            &ToggleSubTaskRequest {
                user_id,
                task_id,
                subtask_id: stored[0].0,
            },
        )
        .unwrap();
        assert!(result.subtask_completed);
        assert_eq!(result.task_progress, 50);
    }

    #[test]
    fn editing_replaces_subtasks_wholesale() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);

        let task_id = add_task_to_db(
            &mut db_connection,
            &task_request(user_id, category_id, vec![subtask("old", true)]),
            test_now(),
        )
        .unwrap();

        let request = SetTaskRequest {
            user_id,
            task_id,
            category_id,
            title: "write report".to_string(),
            description: "quarterly status report".to_string(),
            due_date: "2024-01-11".to_string(),
            due_time: "09:00".to_string(),
            priority: Priority::High,
            is_recurring: false,
            track_progress: true,
            subtasks: vec![subtask("new one", false), subtask("   ", false)],
        };
        update_task_in_db(&mut db_connection, &request).unwrap();

        let subtasks = get_subtasks_from_db(&db_connection, task_id).unwrap();
        assert_eq!(subtasks.len(), 1);
        assert_eq!(subtasks[0].1.title, "new one");

        let task = get_task_from_db(&db_connection, user_id, task_id).unwrap();
        assert_eq!(task.progress, 0);
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn completing_a_recurring_task_clones_it_for_tomorrow() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);

        let mut request = task_request(
            user_id,
            category_id,
            vec![subtask("pack bag", true), subtask("fill bottle", false)],
        );
        request.is_recurring = true;
        let task_id = add_task_to_db(&mut db_connection, &request, test_now()).unwrap();

        let result = complete_task(&mut db_connection, user_id, task_id, test_now()).unwrap();
        let clone_id = result.recurring_task_id.expect("recurring clone");

        let original = get_task_from_db(&db_connection, user_id, task_id).unwrap();
        assert!(original.is_completed);
        assert_eq!(original.status, Status::Completed);
        assert_eq!(original.progress, 100);
        assert!(original.completed_at.is_some());
        for (_, subtask) in get_subtasks_from_db(&db_connection, task_id).unwrap() {
            assert!(subtask.is_completed);
        }

        let clone = get_task_from_db(&db_connection, user_id, clone_id).unwrap();
        assert_eq!(clone.due_date, "2024-01-11");
        assert_eq!(clone.title, original.title);
        assert!(clone.is_recurring);
        assert!(!clone.is_completed);

        let clone_subtasks = get_subtasks_from_db(&db_connection, clone_id).unwrap();
        let titles: Vec<&str> = clone_subtasks
            .iter()
            .map(|(_, subtask)| subtask.title.as_str())
            .collect();
        assert_eq!(titles, vec!["pack bag", "fill bottle"]);
        assert!(clone_subtasks.iter().all(|(_, subtask)| !subtask.is_completed));
    }

    #[test]
    fn completing_a_plain_task_does_not_clone() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);
        let task_id =
            add_task_to_db(&mut db_connection, &task_request(user_id, category_id, vec![]), test_now())
                .unwrap();

        let result = complete_task(&mut db_connection, user_id, task_id, test_now()).unwrap();
        assert!(result.recurring_task_id.is_none());
    }

    #[test]
    fn tasks_are_bucketed_by_due_date() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);

        for due_date in ["2024-01-09", "2024-01-10", "2024-01-12"] {
            let mut request = task_request(user_id, category_id, vec![]);
            request.due_date = due_date.to_string();
            add_task_to_db(&mut db_connection, &request, test_now()).unwrap();
        }

        let tasks = get_active_tasks(&db_connection, user_id).unwrap();
        let response = classify_by_due_date(tasks, test_now().date_naive());
        assert_eq!(response.overdue.len(), 1);
        assert_eq!(response.today.len(), 1);
        assert_eq!(response.upcoming.len(), 1);
    }

    #[test]
    fn filters_combine() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);
        let other_category =
            crate::categories::helpers::add_category_to_db(&db_connection, user_id, "Errands", false)
                .unwrap();

        let mut request = task_request(user_id, category_id, vec![]);
        request.priority = Priority::High;
        add_task_to_db(&mut db_connection, &request, test_now()).unwrap();

        let mut request = task_request(user_id, other_category, vec![]);
        request.due_date = "2024-01-15".to_string();
        add_task_to_db(&mut db_connection, &request, test_now()).unwrap();

        let filtered = filter_tasks_from_db(
            &db_connection,
            &FilterTasksRequest {
                user_id,
                category_id: Some(other_category),
                priority: None,
                due: Some(DueFilter::Upcoming),
            },
            test_now().date_naive(),
        )
        .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].1.category_id, other_category);

        let filtered = filter_tasks_from_db(
            &db_connection,
            &FilterTasksRequest {
                user_id,
                category_id: None,
                priority: Some(Priority::High),
                due: None,
            },
            test_now().date_naive(),
        )
        .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].1.priority, Priority::High);
    }

    #[test]
    fn ownership_is_checked() {
        let mut db_connection = test_connection();
        let (user_id, category_id) = seeded_user(&mut db_connection);
        let stranger = crate::users::helpers::register_user_in_db(
            &mut db_connection,
            "mallory",
            "mallory@example.com",
            test_now(),
        )
        .unwrap();

        let task_id =
            add_task_to_db(&mut db_connection, &task_request(user_id, category_id, vec![]), test_now())
                .unwrap();

        assert!(get_task_from_db(&db_connection, stranger, task_id).is_err());
        assert!(complete_task(&mut db_connection, stranger, task_id, test_now()).is_err());
    }
}
