use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

use crate::internal_error::InternalResult;
use crate::tasks::data::{Task, TaskID};
use crate::tasks::helpers::{task_from_row, TASK_COLUMNS};
use crate::users::data::UserID;

use super::data::*;

fn percent(count: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

pub fn get_progress_stats(
    db_connection: &Connection,
    user_id: UserID,
) -> InternalResult<ProgressStats> {
    let count = |query: &str| -> InternalResult<i64> {
        Ok(db_connection.query_row(query, params![user_id], |row| row.get(0))?)
    };

    let not_started =
        count("SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND is_completed = 0 AND status = 0")?;
    let in_progress =
        count("SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND is_completed = 0 AND status = 1")?;
    let completed = count("SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND is_completed = 1")?;

    let total = not_started + in_progress + completed;

    Ok(ProgressStats {
        not_started,
        in_progress,
        completed,
        total,
        not_started_percent: percent(not_started, total),
        in_progress_percent: percent(in_progress, total),
        completed_percent: percent(completed, total),
    })
}

/// Completions per calendar day for the 7 days ending today, oldest first.
pub fn get_completion_stats(
    db_connection: &Connection,
    user_id: UserID,
    now: DateTime<Utc>,
) -> InternalResult<CompletionStats> {
    let labels: Vec<String> = (0..7)
        .rev()
        .map(|days_ago| (now.date_naive() - Duration::days(days_ago)).to_string())
        .collect();
    let mut data = vec![0i64; labels.len()];

    let mut statement = db_connection.prepare(
        "SELECT completed_at FROM tasks \
         WHERE user_id = ?1 AND is_completed = 1 AND completed_at IS NOT NULL",
    )?;
    let rows = statement.query_map(params![user_id], |row| row.get::<_, String>(0))?;

    for row_result in rows {
        let completed_at = row_result?;
        let day = DateTime::parse_from_rfc3339(&completed_at)?
            .date_naive()
            .to_string();

        if let Some(index) = labels.iter().position(|label| *label == day) {
            data[index] += 1;
        }
    }

    Ok(CompletionStats { labels, data })
}

pub fn get_category_stats(
    db_connection: &Connection,
    user_id: UserID,
) -> InternalResult<Vec<CategoryStats>> {
    let categories = crate::categories::helpers::get_categories_from_db(db_connection, user_id)?;

    let mut stats = vec![];
    for (category_id, category) in categories {
        let total: i64 = db_connection.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND category_id = ?2",
            params![user_id, category_id],
            |row| row.get(0),
        )?;
        let completed: i64 = db_connection.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND category_id = ?2 AND is_completed = 1",
            params![user_id, category_id],
            |row| row.get(0),
        )?;

        stats.push(CategoryStats {
            name: category.name,
            total,
            completed,
            completion_rate: percent(completed, total),
        });
    }

    Ok(stats)
}

pub fn get_progress_overview(
    db_connection: &Connection,
    user_id: UserID,
) -> InternalResult<ProgressOverview> {
    let collect = |query: &str| -> InternalResult<Vec<(TaskID, Task)>> {
        let mut statement = db_connection.prepare(query)?;
        let rows = statement.query_map(params![user_id], task_from_row)?;

        let mut tasks = vec![];
        for row_result in rows {
            tasks.push(row_result?);
        }

        Ok(tasks)
    };

    Ok(ProgressOverview {
        tracking_tasks: collect(&format!(
            "SELECT {} FROM tasks WHERE user_id = ?1 AND track_progress = 1 AND is_completed = 0 \
             ORDER BY due_date, due_time",
            TASK_COLUMNS
        ))?,
        recently_completed: collect(&format!(
            "SELECT {} FROM tasks WHERE user_id = ?1 AND is_completed = 1 \
             ORDER BY completed_at DESC LIMIT 5",
            TASK_COLUMNS
        ))?,
        category_stats: get_category_stats(db_connection, user_id)?,
    })
}
