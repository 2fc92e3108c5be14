use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

use crate::achievements::data::{Achievement, AchievementID};
use crate::categories::data::CategoryID;
use crate::users::data::UserID;

pub type TaskID = i64;
pub type SubTaskID = i64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    InProgress,
    Completed,
}

impl Status {
    pub fn as_i64(self) -> i64 {
        match self {
            Status::NotStarted => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Status> {
        match value {
            0 => Some(Status::NotStarted),
            1 => Some(Status::InProgress),
            2 => Some(Status::Completed),
            _ => None,
        }
    }

    /// Status as derived on the direct progress-update path. The subtask
    /// path never re-derives status; see `update_progress_from_subtasks`.
    pub fn from_progress(progress: i64) -> Status {
        match progress {
            0 => Status::NotStarted,
            1..=99 => Status::InProgress,
            _ => Status::Completed,
        }
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let value = i64::column_result(value)?;
        Status::from_i64(value).ok_or(FromSqlError::OutOfRange(value))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_i64(self) -> i64 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn from_i64(value: i64) -> Option<Priority> {
        match value {
            1 => Some(Priority::Low),
            2 => Some(Priority::Medium),
            3 => Some(Priority::High),
            _ => None,
        }
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let value = i64::column_result(value)?;
        Priority::from_i64(value).ok_or(FromSqlError::OutOfRange(value))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Task {
    pub user_id: UserID,
    pub category_id: CategoryID,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub due_time: String,
    pub priority: Priority,
    pub status: Status,
    pub progress: i64,
    pub track_progress: bool,
    pub is_recurring: bool,
    pub is_completed: bool,
    pub completed_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubTask {
    pub title: String,
    pub is_completed: bool,
}

#[derive(Deserialize, Debug)]
pub struct AddTaskRequest {
    pub user_id: UserID,
    pub category_id: CategoryID,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub due_time: String,
    pub priority: Priority,
    pub is_recurring: bool,
    pub track_progress: bool,
    pub subtasks: Vec<SubTask>,
}

#[derive(Serialize, Debug)]
pub struct AddTaskResult {
    pub task_id: TaskID,
}

#[derive(Deserialize, Debug)]
pub struct SetTaskRequest {
    pub user_id: UserID,
    pub task_id: TaskID,
    pub category_id: CategoryID,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub due_time: String,
    pub priority: Priority,
    pub is_recurring: bool,
    pub track_progress: bool,
    pub subtasks: Vec<SubTask>,
}

#[derive(Deserialize, Debug)]
pub struct DeleteTaskRequest {
    pub user_id: UserID,
    pub task_id: TaskID,
}

#[derive(Deserialize, Debug)]
pub struct CompleteTaskRequest {
    pub user_id: UserID,
    pub task_id: TaskID,
}

#[derive(Serialize, Debug)]
pub struct CompleteTaskResult {
    pub new_achievements: Vec<(AchievementID, Achievement)>,
    pub recurring_task_id: Option<TaskID>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateProgressRequest {
    pub user_id: UserID,
    pub task_id: TaskID,
    pub progress: i64,
}

#[derive(Serialize, Debug)]
pub struct UpdateProgressResult {
    pub progress: i64,
    pub status: Status,
}

#[derive(Deserialize, Debug)]
pub struct ToggleSubTaskRequest {
    pub user_id: UserID,
    pub task_id: TaskID,
    pub subtask_id: SubTaskID,
}

#[derive(Serialize, Debug)]
pub struct ToggleSubTaskResult {
    pub subtask_completed: bool,
    pub task_progress: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueFilter {
    Today,
    Upcoming,
    Overdue,
}

#[derive(Deserialize, Debug)]
pub struct FilterTasksRequest {
    pub user_id: UserID,
    pub category_id: Option<CategoryID>,
    pub priority: Option<Priority>,
    pub due: Option<DueFilter>,
}

#[derive(Serialize, Debug)]
pub struct TaskListResponse {
    pub today: Vec<(TaskID, Task)>,
    pub upcoming: Vec<(TaskID, Task)>,
    pub overdue: Vec<(TaskID, Task)>,
}
