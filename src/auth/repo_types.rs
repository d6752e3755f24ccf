use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. `creator` is assigned automatically when a user creates a
/// creator profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Creator,
    Admin,
}

/// User record in the database. Deliberately not `Serialize`; responses go
/// through `UserPayload` so the password hash can never leak into JSON.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub profile_photo: String,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub fitness_goal: Vec<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub password_changed_at: Option<OffsetDateTime>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<OffsetDateTime>,
    pub email_verification_token: Option<String>,
    pub email_verification_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// One-time numeric code, stored only as an argon2 hash. A user may hold
/// several rows at once; verification deletes them all.
#[derive(Debug, Clone, FromRow)]
pub struct Otp {
    pub id: Uuid,
    pub user_id: Uuid,
    pub otp_hash: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}
