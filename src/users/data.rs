use serde::{Deserialize, Serialize};

use crate::achievements::data::{Achievement, AchievementID};

pub type UserID = i64;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub username: String,
    pub email: String,
    pub joined_at: String,
}

#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
}

#[derive(Serialize, Debug)]
pub struct RegisterResult {
    pub user_id: UserID,
}

#[derive(Deserialize, Debug)]
pub struct DeleteUserRequest {
    pub user_id: UserID,
}

#[derive(Serialize, Debug)]
pub struct Profile {
    pub username: String,
    pub tasks_count: i64,
    pub completed_count: i64,
    pub achievements_count: i64,
    pub categories_count: i64,
    pub recent_achievements: Vec<(AchievementID, Achievement)>,
}
