use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Creator profile record; at most one per user (unique constraint on
/// `user_id`). Serialization goes through the DTO projections.
#[derive(Debug, Clone, FromRow)]
pub struct CreatorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub specialization: Vec<String>,
    pub subscription_price: f64,
    pub subscription_currency: String,
    pub subscription_interval: String,
    pub bio: Option<String>,
    pub profile_photo: String,
    pub banner_image: Option<String>,
    pub socials: Option<serde_json::Value>,
    pub is_verified: bool,
    pub verified_at: Option<OffsetDateTime>,
    pub is_active: bool,
    pub deactivated_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}
