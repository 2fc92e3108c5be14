use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::internal_error::InternalResult;
use crate::users::data::UserID;

use super::data::*;

/// Award order is table order: completion-count rules, then priority rules.
/// Streak rules are a reserved extension of this table.
/// TODO: compute consecutive-day completion streaks and add their rules here.
pub const RULES: &[AchievementRule] = &[
    AchievementRule {
        name: "Task Beginner",
        description: "Complete your first task",
        metric: Metric::CompletedTasks,
        threshold: 1,
        trophy_level: TrophyLevel::Bronze,
    },
    AchievementRule {
        name: "Task Enthusiast",
        description: "Complete 10 tasks",
        metric: Metric::CompletedTasks,
        threshold: 10,
        trophy_level: TrophyLevel::Bronze,
    },
    AchievementRule {
        name: "Task Master",
        description: "Complete 25 tasks",
        metric: Metric::CompletedTasks,
        threshold: 25,
        trophy_level: TrophyLevel::Silver,
    },
    AchievementRule {
        name: "Task Guru",
        description: "Complete 50 tasks",
        metric: Metric::CompletedTasks,
        threshold: 50,
        trophy_level: TrophyLevel::Silver,
    },
    AchievementRule {
        name: "Task Legend",
        description: "Complete 100 tasks",
        metric: Metric::CompletedTasks,
        threshold: 100,
        trophy_level: TrophyLevel::Gold,
    },
    AchievementRule {
        name: "Priority Handler",
        description: "Complete 5 high-priority tasks",
        metric: Metric::HighPriorityCompleted,
        threshold: 5,
        trophy_level: TrophyLevel::Bronze,
    },
    AchievementRule {
        name: "Priority Master",
        description: "Complete 20 high-priority tasks",
        metric: Metric::HighPriorityCompleted,
        threshold: 20,
        trophy_level: TrophyLevel::Silver,
    },
];

pub fn completed_tasks_count(db_connection: &Connection, user_id: UserID) -> InternalResult<i64> {
    let count = db_connection.query_row(
        "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND is_completed = 1",
        params![user_id],
        |row| row.get(0),
    )?;

    Ok(count)
}

pub fn high_priority_completed_count(
    db_connection: &Connection,
    user_id: UserID,
) -> InternalResult<i64> {
    let count = db_connection.query_row(
        "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND is_completed = 1 AND priority = 3",
        params![user_id],
        |row| row.get(0),
    )?;

    Ok(count)
}

fn achievement_exists(
    db_connection: &Connection,
    user_id: UserID,
    name: &str,
) -> InternalResult<bool> {
    let count: i64 = db_connection.query_row(
        "SELECT COUNT(*) FROM achievements WHERE user_id = ?1 AND name = ?2",
        params![user_id, name],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Evaluates the rule table against the user's completion counts and
/// persists any newly crossed thresholds. Idempotent: rules already earned
/// are skipped, and a duplicate insert lost to a concurrent evaluation is
/// swallowed by the unique index rather than aborting the batch.
pub fn evaluate_achievements(
    db_connection: &Connection,
    user_id: UserID,
    now: DateTime<Utc>,
) -> InternalResult<Vec<(AchievementID, Achievement)>> {
    let completed = completed_tasks_count(db_connection, user_id)?;
    let high_priority = high_priority_completed_count(db_connection, user_id)?;

    let mut new_achievements = vec![];

    for rule in RULES {
        if achievement_exists(db_connection, user_id, rule.name)? {
            continue;
        }

        let count = match rule.metric {
            Metric::CompletedTasks => completed,
            Metric::HighPriorityCompleted => high_priority,
        };
        if count < rule.threshold {
            continue;
        }

        let earned_at = now.to_rfc3339();
        let inserted = db_connection.execute(
            "INSERT OR IGNORE INTO achievements (user_id, name, description, trophy_level, earned_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, rule.name, rule.description, rule.trophy_level, earned_at],
        )?;
        // A concurrent evaluation got there first; not newly earned.
        if inserted == 0 {
            continue;
        }

        log::info!("user {} earned achievement {}", user_id, rule.name);

        new_achievements.push((
            db_connection.last_insert_rowid(),
            Achievement {
                name: rule.name.to_string(),
                description: rule.description.to_string(),
                trophy_level: rule.trophy_level,
                earned_at,
            },
        ));
    }

    Ok(new_achievements)
}

pub fn get_achievements_from_db(
    db_connection: &Connection,
    user_id: UserID,
) -> InternalResult<Vec<(AchievementID, Achievement)>> {
    let mut statement = db_connection.prepare(
        "SELECT rowid, name, description, trophy_level, earned_at FROM achievements \
         WHERE user_id = ?1 ORDER BY trophy_level DESC, earned_at DESC",
    )?;

    let rows = statement.query_map(params![user_id], |row| {
        Ok((
            row.get(0)?,
            Achievement {
                name: row.get(1)?,
                description: row.get(2)?,
                trophy_level: row.get(3)?,
                earned_at: row.get(4)?,
            },
        ))
    })?;

    let mut achievements = vec![];
    for row_result in rows {
        achievements.push(row_result?);
    }

    Ok(achievements)
}

pub fn get_recent_achievements(
    db_connection: &Connection,
    user_id: UserID,
    limit: i64,
) -> InternalResult<Vec<(AchievementID, Achievement)>> {
    let mut statement = db_connection.prepare(
        "SELECT rowid, name, description, trophy_level, earned_at FROM achievements \
         WHERE user_id = ?1 ORDER BY earned_at DESC LIMIT ?2",
    )?;

    let rows = statement.query_map(params![user_id, limit], |row| {
        Ok((
            row.get(0)?,
            Achievement {
                name: row.get(1)?,
                description: row.get(2)?,
                trophy_level: row.get(3)?,
                earned_at: row.get(4)?,
            },
        ))
    })?;

    let mut achievements = vec![];
    for row_result in rows {
        achievements.push(row_result?);
    }

    Ok(achievements)
}

pub fn get_achievement_summary(
    db_connection: &Connection,
    user_id: UserID,
) -> InternalResult<AchievementSummary> {
    Ok(AchievementSummary {
        achievements: get_achievements_from_db(db_connection, user_id)?,
        completed_tasks: completed_tasks_count(db_connection, user_id)?,
        high_priority_completed: high_priority_completed_count(db_connection, user_id)?,
        // Streak rules are not computed yet; reported as absent.
        streak: 0,
    })
}
