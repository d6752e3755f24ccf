use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::creators::repo_types::CreatorProfile;
use crate::error::AppError;

pub const ALLOWED_SPECIALIZATIONS: &[&str] = &[
    "fitness",
    "nutrition",
    "mindfulness",
    "coaching",
    "sports",
    "wellness",
];

pub const MAX_BIO_LEN: usize = 150;
pub const MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCreatorRequest {
    pub display_name: String,
    pub specialization: Vec<String>,
    pub subscription_price: f64,
    pub subscription_currency: Option<String>,
    pub subscription_interval: Option<String>,
    pub bio: Option<String>,
    pub profile_photo: Option<String>,
    pub banner_image: Option<String>,
    pub socials: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCreatorRequest {
    pub display_name: Option<String>,
    pub specialization: Option<Vec<String>>,
    pub subscription_price: Option<f64>,
    pub subscription_currency: Option<String>,
    pub subscription_interval: Option<String>,
    pub bio: Option<String>,
    pub profile_photo: Option<String>,
    pub banner_image: Option<String>,
    pub socials: Option<serde_json::Value>,
}

/// Discovery query: filters + pagination + sort.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorListQuery {
    pub specialization: Option<String>,
    pub is_verified: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    SubscriptionPrice,
}

impl SortKey {
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::SubscriptionPrice => "subscription_price",
        }
    }
}

/// Parses the `sort` query value (`createdAt`, `-subscriptionPrice`, ...).
pub fn parse_sort(sort: Option<&str>) -> Result<(SortKey, bool), AppError> {
    let Some(raw) = sort else {
        return Ok((SortKey::CreatedAt, true));
    };
    let (field, descending) = match raw.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    match field {
        "createdAt" => Ok((SortKey::CreatedAt, descending)),
        "subscriptionPrice" => Ok((SortKey::SubscriptionPrice, descending)),
        _ => Err(AppError::validation(
            "Sort must be createdAt or subscriptionPrice",
        )),
    }
}

pub fn validate_display_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    let chars = name.chars().count();
    if chars < 3 || chars > 50 {
        return Err(AppError::validation(
            "Display name must be between 3 and 50 characters",
        ));
    }
    Ok(name.to_string())
}

/// Lowercases/trims and checks membership in the closed category set.
pub fn normalize_specialization(values: &[String]) -> Result<Vec<String>, AppError> {
    if values.is_empty() {
        return Err(AppError::validation(
            "At least one specialization is required",
        ));
    }
    let mut normalized = Vec::with_capacity(values.len());
    for value in values {
        let v = value.trim().to_lowercase();
        if !ALLOWED_SPECIALIZATIONS.contains(&v.as_str()) {
            return Err(AppError::validation(format!(
                "Invalid specialization: {value}"
            )));
        }
        if !normalized.contains(&v) {
            normalized.push(v);
        }
    }
    Ok(normalized)
}

pub fn validate_price(price: f64) -> Result<f64, AppError> {
    if price <= 0.0 || !price.is_finite() {
        return Err(AppError::validation(
            "Subscription price must be greater than 0",
        ));
    }
    Ok(price)
}

pub fn validate_interval(interval: &str) -> Result<String, AppError> {
    if interval != "monthly" {
        return Err(AppError::validation(
            "Subscription interval must be monthly",
        ));
    }
    Ok(interval.to_string())
}

pub fn validate_bio(bio: &str) -> Result<String, AppError> {
    let bio = bio.trim();
    if bio.chars().count() > MAX_BIO_LEN {
        return Err(AppError::validation(
            "Bio must have less or equal than 150 characters",
        ));
    }
    Ok(bio.to_string())
}

/// Full document; returned to the owner and to admins.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorPayload {
    pub id: Uuid,
    pub user: Uuid,
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

impl From<CreatorProfile> for CreatorPayload {
    fn from(p: CreatorProfile) -> Self {
        Self {
            id: p.id,
            user: p.user_id,
            display_name: p.display_name,
            specialization: p.specialization,
            subscription_price: p.subscription_price,
            subscription_currency: p.subscription_currency,
            subscription_interval: p.subscription_interval,
            bio: p.bio,
            profile_photo: p.profile_photo,
            banner_image: p.banner_image,
            socials: p.socials,
            is_verified: p.is_verified,
            verified_at: p.verified_at,
            is_active: p.is_active,
            deactivated_at: p.deactivated_at,
            created_at: p.created_at,
        }
    }
}

/// Whitelisted projection for everyone else; moderation internals
/// (activation state and timestamps) stay server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorPublic {
    pub id: Uuid,
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
    pub created_at: OffsetDateTime,
}

impl From<CreatorProfile> for CreatorPublic {
    fn from(p: CreatorProfile) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name,
            specialization: p.specialization,
            subscription_price: p.subscription_price,
            subscription_currency: p.subscription_currency,
            subscription_interval: p.subscription_interval,
            bio: p.bio,
            profile_photo: p.profile_photo,
            banner_image: p.banner_image,
            socials: p.socials,
            is_verified: p.is_verified,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatorResponse {
    pub status: &'static str,
    pub data: CreatorData,
}

#[derive(Debug, Serialize)]
pub struct CreatorData {
    pub creator: CreatorPayload,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreatorView {
    Full(CreatorPayload),
    Public(CreatorPublic),
}

#[derive(Debug, Serialize)]
pub struct CreatorListResponse {
    pub status: &'static str,
    pub results: usize,
    pub creators: Vec<CreatorView>,
}

#[derive(Debug, Serialize)]
pub struct CreatorViewResponse {
    pub status: &'static str,
    pub data: CreatorViewData,
}

#[derive(Debug, Serialize)]
pub struct CreatorViewData {
    pub creator: CreatorView,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> CreatorProfile {
        CreatorProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            display_name: "Coach Legend".into(),
            specialization: vec!["fitness".into()],
            subscription_price: 2000.0,
            subscription_currency: "NGN".into(),
            subscription_interval: "monthly".into(),
            bio: None,
            profile_photo: "default.jpg".into(),
            banner_image: None,
            socials: None,
            is_verified: false,
            verified_at: None,
            is_active: true,
            deactivated_at: Some(OffsetDateTime::now_utc()),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn specialization_is_lowercased_and_deduped() {
        let out =
            normalize_specialization(&["  Fitness ".into(), "YOGA".into()]).map(|_| ());
        assert!(out.is_err(), "yoga is not in the category set");

        let out =
            normalize_specialization(&["  Fitness ".into(), "fitness".into(), "Sports".into()])
                .unwrap();
        assert_eq!(out, vec!["fitness".to_string(), "sports".to_string()]);
    }

    #[test]
    fn empty_specialization_rejected() {
        assert!(normalize_specialization(&[]).is_err());
    }

    #[test]
    fn price_must_be_positive() {
        assert!(validate_price(0.0).is_err());
        assert!(validate_price(-5.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert_eq!(validate_price(0.01).unwrap(), 0.01);
    }

    #[test]
    fn interval_only_monthly() {
        assert!(validate_interval("weekly").is_err());
        assert_eq!(validate_interval("monthly").unwrap(), "monthly");
    }

    #[test]
    fn display_name_bounds() {
        assert!(validate_display_name("ab").is_err());
        assert!(validate_display_name(&"x".repeat(51)).is_err());
        assert_eq!(validate_display_name("  Coach Legend ").unwrap(), "Coach Legend");
    }

    #[test]
    fn bio_bounded() {
        assert!(validate_bio(&"x".repeat(151)).is_err());
        assert_eq!(validate_bio("short bio").unwrap(), "short bio");
    }

    #[test]
    fn length_limits_count_characters_not_bytes() {
        // "ö" is two bytes; byte-counting would reject these.
        assert!(validate_display_name(&"ö".repeat(50)).is_ok());
        assert!(validate_display_name(&"ö".repeat(51)).is_err());
        assert!(validate_bio(&"ö".repeat(150)).is_ok());
        assert!(validate_bio(&"ö".repeat(151)).is_err());
    }

    #[test]
    fn sort_parsing() {
        assert_eq!(parse_sort(None).unwrap(), (SortKey::CreatedAt, true));
        assert_eq!(
            parse_sort(Some("-subscriptionPrice")).unwrap(),
            (SortKey::SubscriptionPrice, true)
        );
        assert_eq!(
            parse_sort(Some("createdAt")).unwrap(),
            (SortKey::CreatedAt, false)
        );
        assert!(parse_sort(Some("displayName")).is_err());
    }

    #[test]
    fn public_view_hides_moderation_internals() {
        let json =
            serde_json::to_string(&CreatorPublic::from(sample_profile())).unwrap();
        assert!(!json.contains("isActive"));
        assert!(!json.contains("deactivatedAt"));
        assert!(json.contains("\"isVerified\""));
        assert!(json.contains("\"displayName\""));
    }

    #[test]
    fn full_view_keeps_moderation_fields() {
        let json =
            serde_json::to_string(&CreatorPayload::from(sample_profile())).unwrap();
        assert!(json.contains("\"isActive\""));
        assert!(json.contains("\"deactivatedAt\""));
    }
}
