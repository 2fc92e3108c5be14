use serde::Serialize;

use crate::tasks::data::{Task, TaskID};

#[derive(Serialize, Debug, PartialEq)]
pub struct ProgressStats {
    pub not_started: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub total: i64,
    pub not_started_percent: f64,
    pub in_progress_percent: f64,
    pub completed_percent: f64,
}

/// Parallel label/count sequences, oldest day first.
#[derive(Serialize, Debug, PartialEq)]
pub struct CompletionStats {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct CategoryStats {
    pub name: String,
    pub total: i64,
    pub completed: i64,
    pub completion_rate: f64,
}

#[derive(Serialize, Debug)]
pub struct ProgressOverview {
    pub tracking_tasks: Vec<(TaskID, Task)>,
    pub recently_completed: Vec<(TaskID, Task)>,
    pub category_stats: Vec<CategoryStats>,
}
