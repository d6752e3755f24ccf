use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::creators::dto::SortKey;
use crate::creators::repo_types::CreatorProfile;

const CREATOR_COLS: &str = "id, user_id, display_name, specialization, subscription_price, \
     subscription_currency, subscription_interval, bio, profile_photo, banner_image, socials, \
     is_verified, verified_at, is_active, deactivated_at, created_at";

pub struct NewCreatorProfile {
    pub user_id: Uuid,
    pub display_name: String,
    pub specialization: Vec<String>,
    pub subscription_price: f64,
    pub subscription_currency: String,
    pub subscription_interval: String,
    pub bio: Option<String>,
    pub profile_photo: Option<String>,
    pub banner_image: Option<String>,
    pub socials: Option<serde_json::Value>,
}

#[derive(Debug, Default)]
pub struct CreatorListFilter {
    pub specializations: Option<Vec<String>>,
    pub is_verified: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub only_active: bool,
    pub sort: Option<(SortKey, bool)>,
    pub limit: i64,
    pub offset: i64,
}

impl CreatorProfile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<CreatorProfile>> {
        let sql = format!("SELECT {CREATOR_COLS} FROM creator_profiles WHERE user_id = $1");
        sqlx::query_as::<_, CreatorProfile>(&sql)
            .bind(user_id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<CreatorProfile>> {
        let sql = format!("SELECT {CREATOR_COLS} FROM creator_profiles WHERE id = $1");
        sqlx::query_as::<_, CreatorProfile>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(db: &PgPool, new: NewCreatorProfile) -> sqlx::Result<CreatorProfile> {
        let sql = format!(
            "INSERT INTO creator_profiles \
                 (user_id, display_name, specialization, subscription_price, \
                  subscription_currency, subscription_interval, bio, profile_photo, \
                  banner_image, socials) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'default.jpg'), $9, $10) \
             RETURNING {CREATOR_COLS}"
        );
        sqlx::query_as::<_, CreatorProfile>(&sql)
            .bind(new.user_id)
            .bind(&new.display_name)
            .bind(&new.specialization)
            .bind(new.subscription_price)
            .bind(&new.subscription_currency)
            .bind(&new.subscription_interval)
            .bind(&new.bio)
            .bind(&new.profile_photo)
            .bind(&new.banner_image)
            .bind(&new.socials)
            .fetch_one(db)
            .await
    }

    pub async fn list(db: &PgPool, filter: &CreatorListFilter) -> sqlx::Result<Vec<CreatorProfile>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {CREATOR_COLS} FROM creator_profiles WHERE TRUE"
        ));
        if filter.only_active {
            qb.push(" AND is_active = TRUE");
        }
        if let Some(specs) = &filter.specializations {
            // any overlap with the requested categories
            qb.push(" AND specialization && ").push_bind(specs.clone());
        }
        if let Some(verified) = filter.is_verified {
            qb.push(" AND is_verified = ").push_bind(verified);
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND subscription_price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND subscription_price <= ").push_bind(max);
        }
        let (key, descending) = filter.sort.unwrap_or((SortKey::CreatedAt, true));
        qb.push(" ORDER BY ")
            .push(key.column())
            .push(if descending { " DESC" } else { " ASC" });
        qb.push(" LIMIT ").push_bind(filter.limit);
        qb.push(" OFFSET ").push_bind(filter.offset);

        qb.build_query_as::<CreatorProfile>().fetch_all(db).await
    }

    /// Owner self-update; absent fields keep their current value.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_by_user(
        db: &PgPool,
        user_id: Uuid,
        display_name: Option<&str>,
        specialization: Option<&[String]>,
        subscription_price: Option<f64>,
        subscription_currency: Option<&str>,
        subscription_interval: Option<&str>,
        bio: Option<&str>,
        profile_photo: Option<&str>,
        banner_image: Option<&str>,
        socials: Option<&serde_json::Value>,
    ) -> sqlx::Result<Option<CreatorProfile>> {
        let sql = format!(
            "UPDATE creator_profiles SET \
                 display_name = COALESCE($2, display_name), \
                 specialization = COALESCE($3, specialization), \
                 subscription_price = COALESCE($4, subscription_price), \
                 subscription_currency = COALESCE($5, subscription_currency), \
                 subscription_interval = COALESCE($6, subscription_interval), \
                 bio = COALESCE($7, bio), \
                 profile_photo = COALESCE($8, profile_photo), \
                 banner_image = COALESCE($9, banner_image), \
                 socials = COALESCE($10, socials) \
             WHERE user_id = $1 RETURNING {CREATOR_COLS}"
        );
        sqlx::query_as::<_, CreatorProfile>(&sql)
            .bind(user_id)
            .bind(display_name)
            .bind(specialization)
            .bind(subscription_price)
            .bind(subscription_currency)
            .bind(subscription_interval)
            .bind(bio)
            .bind(profile_photo)
            .bind(banner_image)
            .bind(socials)
            .fetch_optional(db)
            .await
    }

    pub async fn delete_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM creator_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM creator_profiles WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_active(
        db: &PgPool,
        id: Uuid,
        active: bool,
    ) -> sqlx::Result<Option<CreatorProfile>> {
        let sql = format!(
            "UPDATE creator_profiles SET is_active = $2, \
                 deactivated_at = CASE WHEN $2 THEN NULL ELSE now() END \
             WHERE id = $1 RETURNING {CREATOR_COLS}"
        );
        sqlx::query_as::<_, CreatorProfile>(&sql)
            .bind(id)
            .bind(active)
            .fetch_optional(db)
            .await
    }

    pub async fn set_verified(db: &PgPool, id: Uuid) -> sqlx::Result<Option<CreatorProfile>> {
        let sql = format!(
            "UPDATE creator_profiles SET is_verified = TRUE, verified_at = now() \
             WHERE id = $1 RETURNING {CREATOR_COLS}"
        );
        sqlx::query_as::<_, CreatorProfile>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
    }
}
