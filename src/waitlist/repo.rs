use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
}

impl WaitlistEntry {
    pub async fn create(db: &PgPool, full_name: &str, email: &str) -> sqlx::Result<WaitlistEntry> {
        sqlx::query_as::<_, WaitlistEntry>(
            "INSERT INTO waitlist (full_name, email) VALUES ($1, $2) \
             RETURNING id, full_name, email, created_at",
        )
        .bind(full_name)
        .bind(email)
        .fetch_one(db)
        .await
    }
}
