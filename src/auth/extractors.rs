use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use time::OffsetDateTime;
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::{Role, User};
use crate::error::AppError;
use crate::state::AppState;

/// Resolved, authenticated identity. Extraction runs the full gate: bearer
/// header -> signature check -> live user lookup -> password-change
/// freshness. Any failure short-circuits before the handler body runs.
pub struct CurrentUser(pub User);

/// Same gate plus the email-verification requirement.
pub struct VerifiedUser(pub User);

pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::unauthenticated("You are not logged in, please provide a token")
        })?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| AppError::unauthenticated("Invalid Authorization header"))
}

async fn resolve_user(parts: &mut Parts, state: &AppState) -> Result<User, AppError> {
    let token = bearer_token(parts)?;

    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        AppError::unauthenticated("Invalid or expired token")
    })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| {
            AppError::unauthenticated("User belonging to this token no longer exists")
        })?;

    if !user.is_active {
        return Err(AppError::unauthenticated(
            "User belonging to this token no longer exists",
        ));
    }

    // Sole revocation mechanism: a password change invalidates every token
    // issued before it.
    if !issued_after_password_change(claims.iat, user.password_changed_at) {
        return Err(AppError::unauthenticated(
            "Password was changed recently, please log in again",
        ));
    }

    Ok(user)
}

/// A token stays valid only if it was issued strictly after the last
/// password change. The reset flow backdates `password_changed_at` by one
/// second so the token it hands back in the same second still passes.
pub(crate) fn issued_after_password_change(
    iat: usize,
    changed_at: Option<OffsetDateTime>,
) -> bool {
    match changed_at {
        Some(ts) => (iat as i64) > ts.unix_timestamp(),
        None => true,
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(resolve_user(parts, state).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for VerifiedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state).await?;
        if !user.is_verified {
            return Err(AppError::forbidden(
                "You must be verified to access this route",
            ));
        }
        Ok(VerifiedUser(user))
    }
}

/// Role gate applied at the top of admin handlers, before any side effect.
pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You are not allowed to perform this action",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    fn make_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Legend".into(),
            email: "legend@x.com".into(),
            password_hash: "hash".into(),
            role,
            profile_photo: "default.jpg".into(),
            bio: None,
            gender: None,
            fitness_goal: vec![],
            is_active: true,
            is_verified: true,
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            email_verification_token: None,
            email_verification_expires: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn bearer_token_requires_header() {
        let parts = parts_with_auth(None);
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let parts = parts_with_auth(Some("Basic abc"));
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn bearer_token_strips_scheme() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn require_role_allows_member() {
        let user = make_user(Role::Admin);
        assert!(require_role(&user, &[Role::Admin]).is_ok());
    }

    #[test]
    fn require_role_rejects_non_member() {
        let user = make_user(Role::User);
        let err = require_role(&user, &[Role::Admin]).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn token_issued_before_password_change_is_rejected() {
        let changed = OffsetDateTime::now_utc();
        let old_iat = (changed.unix_timestamp() - 60) as usize;
        assert!(!issued_after_password_change(old_iat, Some(changed)));
    }

    #[test]
    fn token_issued_in_the_change_second_is_rejected() {
        let changed = OffsetDateTime::now_utc();
        let same_second = changed.unix_timestamp() as usize;
        assert!(!issued_after_password_change(same_second, Some(changed)));
    }

    #[test]
    fn token_issued_after_password_change_passes() {
        // mirrors the reset flow: change backdated one second, fresh token
        // signed right after
        let changed = OffsetDateTime::now_utc() - time::Duration::seconds(1);
        let fresh_iat = (changed.unix_timestamp() + 1) as usize;
        assert!(issued_after_password_change(fresh_iat, Some(changed)));
    }

    #[test]
    fn user_without_password_change_accepts_any_iat() {
        assert!(issued_after_password_change(0, None));
    }
}
