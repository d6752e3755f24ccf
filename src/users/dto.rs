use serde::{Deserialize, Serialize};

use crate::auth::dto::UserData;

/// Self-service update. Only `gender` and `fitnessGoal` are writable here;
/// password fields are rejected outright so this route cannot bypass the
/// reset flow.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub gender: Option<String>,
    pub fitness_goal: Option<Vec<String>>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub status: &'static str,
    pub data: UserData,
}
