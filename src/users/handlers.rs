use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{dto::UserData, extractors::VerifiedUser, repo_types::User},
    error::AppError,
    state::AppState,
};

use super::dto::{UpdateMeRequest, UserResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/updateme", patch(update_me))
}

#[instrument(skip(user))]
pub async fn get_me(VerifiedUser(user): VerifiedUser) -> Json<UserResponse> {
    Json(UserResponse {
        status: "success",
        data: UserData { user: user.into() },
    })
}

#[instrument(skip(state, user, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    VerifiedUser(user): VerifiedUser,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if payload.password.is_some() || payload.password_confirm.is_some() {
        return Err(AppError::validation(
            "This route is not for password update, use /resetpassword",
        ));
    }

    let updated = User::update_profile(
        &state.db,
        user.id,
        payload.gender.as_deref(),
        payload.fitness_goal.as_deref(),
    )
    .await?;

    info!(user_id = %updated.id, "user profile updated");
    Ok(Json(UserResponse {
        status: "success",
        data: UserData {
            user: updated.into(),
        },
    }))
}
