use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

pub type AchievementID = i64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrophyLevel {
    Bronze,
    Silver,
    Gold,
}

impl TrophyLevel {
    pub fn as_i64(self) -> i64 {
        match self {
            TrophyLevel::Bronze => 1,
            TrophyLevel::Silver => 2,
            TrophyLevel::Gold => 3,
        }
    }

    pub fn from_i64(value: i64) -> Option<TrophyLevel> {
        match value {
            1 => Some(TrophyLevel::Bronze),
            2 => Some(TrophyLevel::Silver),
            3 => Some(TrophyLevel::Gold),
            _ => None,
        }
    }
}

impl ToSql for TrophyLevel {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for TrophyLevel {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let value = i64::column_result(value)?;
        TrophyLevel::from_i64(value).ok_or(FromSqlError::OutOfRange(value))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Achievement {
    pub name: String,
    pub description: String,
    pub trophy_level: TrophyLevel,
    pub earned_at: String,
}

/// Which completed-task count a rule is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    CompletedTasks,
    HighPriorityCompleted,
}

pub struct AchievementRule {
    pub name: &'static str,
    pub description: &'static str,
    pub metric: Metric,
    pub threshold: i64,
    pub trophy_level: TrophyLevel,
}

#[derive(Serialize, Debug)]
pub struct AchievementSummary {
    pub achievements: Vec<(AchievementID, Achievement)>,
    pub completed_tasks: i64,
    pub high_priority_completed: i64,
    pub streak: i64,
}
