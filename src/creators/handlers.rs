use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::{require_role, CurrentUser, VerifiedUser},
        repo_types::{Role, User},
    },
    error::AppError,
    state::AppState,
};

use super::dto::{
    normalize_specialization, parse_sort, validate_bio, validate_display_name, validate_interval,
    validate_price, CreateCreatorRequest, CreatorData, CreatorListQuery, CreatorListResponse,
    CreatorResponse, CreatorView, CreatorViewData, CreatorViewResponse, UpdateCreatorRequest,
    MAX_PAGE_SIZE,
};
use super::repo::{CreatorListFilter, NewCreatorProfile};
use super::repo_types::CreatorProfile;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/creators", post(create_profile).get(list_profiles))
        .route(
            "/creators/me",
            get(get_my_profile)
                .patch(update_my_profile)
                .delete(delete_my_profile),
        )
        .route("/creators/:id", get(get_profile).delete(admin_delete_profile))
        .route("/creators/:id/deactivate", post(deactivate_profile))
        .route("/creators/:id/reactivate", post(reactivate_profile))
        .route("/creators/:id/verify", patch(verify_profile))
}

fn is_owner_or_admin(user: &User, profile: &CreatorProfile) -> bool {
    profile.user_id == user.id || user.role == Role::Admin
}

/// Saturating so an absurd page number can never overflow into a negative
/// OFFSET.
fn page_offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit)
}

fn ensure_no_profile(existing: Option<&CreatorProfile>) -> Result<(), AppError> {
    if existing.is_some() {
        return Err(AppError::conflict("You already have a creator profile"));
    }
    Ok(())
}

#[instrument(skip(state, user, payload))]
pub async fn create_profile(
    State(state): State<AppState>,
    VerifiedUser(user): VerifiedUser,
    Json(payload): Json<CreateCreatorRequest>,
) -> Result<(StatusCode, Json<CreatorResponse>), AppError> {
    let existing = CreatorProfile::find_by_user(&state.db, user.id).await?;
    if existing.is_some() {
        warn!(user_id = %user.id, "duplicate creator profile");
    }
    ensure_no_profile(existing.as_ref())?;

    let new = NewCreatorProfile {
        user_id: user.id,
        display_name: validate_display_name(&payload.display_name)?,
        specialization: normalize_specialization(&payload.specialization)?,
        subscription_price: validate_price(payload.subscription_price)?,
        subscription_currency: payload.subscription_currency.unwrap_or_else(|| "NGN".into()),
        subscription_interval: validate_interval(
            payload.subscription_interval.as_deref().unwrap_or("monthly"),
        )?,
        bio: payload.bio.as_deref().map(validate_bio).transpose()?,
        profile_photo: payload.profile_photo,
        banner_image: payload.banner_image,
        socials: payload.socials,
    };

    let profile = CreatorProfile::create(&state.db, new).await?;

    // Creating a profile is what makes a user a creator.
    if user.role == Role::User {
        User::set_role(&state.db, user.id, Role::Creator).await?;
    }

    info!(user_id = %user.id, creator_id = %profile.id, "creator profile created");
    Ok((
        StatusCode::CREATED,
        Json(CreatorResponse {
            status: "success",
            data: CreatorData {
                creator: profile.into(),
            },
        }),
    ))
}

#[instrument(skip(state, user, query))]
pub async fn list_profiles(
    State(state): State<AppState>,
    VerifiedUser(user): VerifiedUser,
    Query(query): Query<CreatorListQuery>,
) -> Result<Json<CreatorListResponse>, AppError> {
    let specializations = query
        .specialization
        .as_deref()
        .map(|raw| {
            let parts: Vec<String> = raw.split(',').map(str::to_string).collect();
            normalize_specialization(&parts)
        })
        .transpose()?;

    let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);
    let is_admin = user.role == Role::Admin;

    let filter = CreatorListFilter {
        specializations,
        is_verified: query.is_verified,
        min_price: query.min_price,
        max_price: query.max_price,
        only_active: !is_admin,
        sort: Some(parse_sort(query.sort.as_deref())?),
        limit,
        offset: page_offset(page, limit),
    };

    let profiles = CreatorProfile::list(&state.db, &filter).await?;
    let creators: Vec<CreatorView> = profiles
        .into_iter()
        .map(|p| {
            if is_admin {
                CreatorView::Full(p.into())
            } else {
                CreatorView::Public(p.into())
            }
        })
        .collect();

    Ok(Json(CreatorListResponse {
        status: "success",
        results: creators.len(),
        creators,
    }))
}

#[instrument(skip(state, user))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CreatorResponse>, AppError> {
    let profile = CreatorProfile::find_by_user(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Creator profile not found"))?;

    Ok(Json(CreatorResponse {
        status: "success",
        data: CreatorData {
            creator: profile.into(),
        },
    }))
}

#[instrument(skip(state, user))]
pub async fn get_profile(
    State(state): State<AppState>,
    VerifiedUser(user): VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CreatorViewResponse>, AppError> {
    let profile = CreatorProfile::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Creator profile not found"))?;

    let privileged = is_owner_or_admin(&user, &profile);

    // Deactivated profiles are invisible to the public.
    if !profile.is_active && !privileged {
        return Err(AppError::not_found("Creator profile not found"));
    }

    let creator = if privileged {
        CreatorView::Full(profile.into())
    } else {
        CreatorView::Public(profile.into())
    };

    Ok(Json(CreatorViewResponse {
        status: "success",
        data: CreatorViewData { creator },
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn update_my_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateCreatorRequest>,
) -> Result<Json<CreatorResponse>, AppError> {
    let display_name = payload
        .display_name
        .as_deref()
        .map(validate_display_name)
        .transpose()?;
    let specialization = payload
        .specialization
        .as_deref()
        .map(normalize_specialization)
        .transpose()?;
    let price = payload.subscription_price.map(validate_price).transpose()?;
    let interval = payload
        .subscription_interval
        .as_deref()
        .map(validate_interval)
        .transpose()?;
    let bio = payload.bio.as_deref().map(validate_bio).transpose()?;

    let profile = CreatorProfile::update_by_user(
        &state.db,
        user.id,
        display_name.as_deref(),
        specialization.as_deref(),
        price,
        payload.subscription_currency.as_deref(),
        interval.as_deref(),
        bio.as_deref(),
        payload.profile_photo.as_deref(),
        payload.banner_image.as_deref(),
        payload.socials.as_ref(),
    )
    .await?
    .ok_or_else(|| AppError::not_found("Creator profile not found"))?;

    info!(user_id = %user.id, creator_id = %profile.id, "creator profile updated");
    Ok(Json(CreatorResponse {
        status: "success",
        data: CreatorData {
            creator: profile.into(),
        },
    }))
}

#[instrument(skip(state, user))]
pub async fn delete_my_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, AppError> {
    if !CreatorProfile::delete_by_user(&state.db, user.id).await? {
        return Err(AppError::not_found("Creator profile not found"));
    }
    info!(user_id = %user.id, "creator profile deleted by owner");
    Ok(StatusCode::NO_CONTENT)
}

async fn set_profile_active(
    state: &AppState,
    user: &User,
    id: Uuid,
    active: bool,
) -> Result<CreatorProfile, AppError> {
    let profile = CreatorProfile::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Creator profile not found"))?;

    if !is_owner_or_admin(user, &profile) {
        return Err(AppError::forbidden(
            "You are not allowed to perform this action",
        ));
    }

    let updated = CreatorProfile::set_active(&state.db, id, active)
        .await?
        .ok_or_else(|| AppError::not_found("Creator profile not found"))?;
    Ok(updated)
}

#[instrument(skip(state, user))]
pub async fn deactivate_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CreatorResponse>, AppError> {
    let profile = set_profile_active(&state, &user, id, false).await?;
    info!(creator_id = %profile.id, by = %user.id, "creator profile deactivated");
    Ok(Json(CreatorResponse {
        status: "success",
        data: CreatorData {
            creator: profile.into(),
        },
    }))
}

#[instrument(skip(state, user))]
pub async fn reactivate_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CreatorResponse>, AppError> {
    let profile = set_profile_active(&state, &user, id, true).await?;
    info!(creator_id = %profile.id, by = %user.id, "creator profile reactivated");
    Ok(Json(CreatorResponse {
        status: "success",
        data: CreatorData {
            creator: profile.into(),
        },
    }))
}

#[instrument(skip(state, user))]
pub async fn admin_delete_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&user, &[Role::Admin])?;

    if !CreatorProfile::delete_by_id(&state.db, id).await? {
        return Err(AppError::not_found("Creator profile not found"));
    }
    info!(creator_id = %id, by = %user.id, "creator profile deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user))]
pub async fn verify_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CreatorResponse>, AppError> {
    require_role(&user, &[Role::Admin])?;

    let profile = CreatorProfile::set_verified(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Creator profile not found"))?;

    info!(creator_id = %profile.id, by = %user.id, "creator profile verified");
    Ok(Json(CreatorResponse {
        status: "success",
        data: CreatorData {
            creator: profile.into(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

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
            deactivated_at: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn page_offset_basic_pagination() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
    }

    #[test]
    fn page_offset_never_overflows_or_goes_negative() {
        assert_eq!(page_offset(i64::MAX, MAX_PAGE_SIZE), i64::MAX);
        assert!(page_offset(i64::MAX, 50) >= 0);
        assert_eq!(page_offset(1, i64::MAX), 0);
    }

    #[test]
    fn second_profile_for_same_user_is_a_conflict() {
        let profile = sample_profile();
        let err = ensure_no_profile(Some(&profile)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("already have a creator profile"));
    }

    #[test]
    fn first_profile_passes_the_duplicate_check() {
        assert!(ensure_no_profile(None).is_ok());
    }
}
