use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{auth::handlers::is_valid_email, error::AppError, mailer, state::AppState};

use super::repo::WaitlistEntry;

pub fn routes() -> Router<AppState> {
    Router::new().route("/waitlist", post(join_waitlist))
}

#[derive(Debug, Deserialize)]
pub struct JoinWaitlistRequest {
    #[serde(alias = "fullName")]
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinWaitlistResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: WaitlistData,
}

#[derive(Debug, Serialize)]
pub struct WaitlistData {
    pub user: WaitlistEntry,
}

#[instrument(skip(state, payload))]
pub async fn join_waitlist(
    State(state): State<AppState>,
    Json(payload): Json<JoinWaitlistRequest>,
) -> Result<(StatusCode, Json<JoinWaitlistResponse>), AppError> {
    let (Some(name), Some(email)) = (payload.name, payload.email) else {
        return Err(AppError::validation("Provide name and email"));
    };
    let name = name.trim().to_string();
    let email = email.trim().to_lowercase();
    if name.is_empty() {
        return Err(AppError::validation("Provide name and email"));
    }
    if !is_valid_email(&email) {
        return Err(AppError::validation("Provide a valid email"));
    }

    let entry = WaitlistEntry::create(&state.db, &name, &email).await?;

    mailer::dispatch(&state, mailer::waitlist_email(&entry.full_name, &entry.email));

    info!(email = %entry.email, "waitlist joined");
    Ok((
        StatusCode::CREATED,
        Json(JoinWaitlistResponse {
            status: "success",
            message: "Congratulations, waitlist joined",
            data: WaitlistData { user: entry },
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn request_accepts_full_name_alias() {
        let req: JoinWaitlistRequest =
            serde_json::from_str(r#"{"fullName":"Legend","email":"l@x.com"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Legend"));
    }

    #[test]
    fn entry_serializes_without_created_at() {
        let entry = WaitlistEntry {
            id: Uuid::new_v4(),
            full_name: "Legend".into(),
            email: "l@x.com".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(!json.contains("createdAt"));
    }
}
