use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
            ResetPasswordRequest, ResetPasswordResponse, SignupRequest, SignupResponse, UserData,
            VerifyOtpRequest,
        },
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{Otp, User},
        tokens::{generate_numeric_otp, generate_opaque_secret, hash_secret},
    },
    error::AppError,
    mailer,
    state::AppState,
};

const RESET_TOKEN_TTL: Duration = Duration::minutes(10);
const OTP_TTL: Duration = Duration::minutes(10);
const VERIFICATION_TOKEN_TTL: Duration = Duration::days(30);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup))
        .route("/users/login", post(login))
        .route("/users/forgotpassword", post(forgot_password))
        .route("/users/resetpassword/:token", patch(reset_password))
        .route("/users/verifyemail/:token", patch(verify_email))
        .route("/users/VerifyOtp", post(verify_otp))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

// Characters, not bytes; a multibyte password is as long as the user typed it.
fn password_long_enough(password: &str) -> bool {
    password.chars().count() >= 8
}

fn check_otp(record: Option<&Otp>, supplied: &str) -> Result<(), AppError> {
    let record =
        record.ok_or_else(|| AppError::invalid_token("OTP has expired or does not exist"))?;
    if !verify_password(supplied, &record.otp_hash)? {
        return Err(AppError::invalid_token("Invalid OTP"));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.full_name = payload.full_name.trim().to_string();

    if payload.full_name.is_empty() {
        return Err(AppError::validation("A user must have a name"));
    }
    if !is_valid_email(&payload.email) {
        return Err(AppError::validation("Please provide a valid email"));
    }
    if !password_long_enough(&payload.password) {
        return Err(AppError::validation(
            "Password must have at least 8 characters",
        ));
    }
    if payload.password != payload.password_confirm {
        return Err(AppError::validation("Password must be the same"));
    }
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::conflict("A user with this email already exists"));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.full_name, &payload.email, &password_hash).await?;

    // Verification side channel: OTP row plus an email link token. Failure
    // to deliver must never fail the signup.
    let otp = generate_numeric_otp();
    let otp_hash = hash_password(&otp)?;
    Otp::create(
        &state.db,
        user.id,
        &otp_hash,
        OffsetDateTime::now_utc() + OTP_TTL,
    )
    .await?;

    let verification_secret = generate_opaque_secret();
    User::set_verification_token(
        &state.db,
        user.id,
        &hash_secret(&verification_secret),
        OffsetDateTime::now_utc() + VERIFICATION_TOKEN_TTL,
    )
    .await?;

    let verify_url = format!(
        "{}/api/v1/users/verifyemail/{}",
        state.config.mail.public_base_url, verification_secret
    );
    mailer::dispatch(
        &state,
        mailer::welcome_email(&user.full_name, &user.email, &otp, &verify_url),
    );

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            status: "success",
            token,
            data: UserData { user: user.into() },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::validation("Provide email and password"));
    };
    let email = email.trim().to_lowercase();

    // Same message for unknown email, wrong password and inactive account;
    // nothing here may reveal which accounts exist.
    let bad_credentials = || AppError::unauthenticated("Incorrect email or password");

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(bad_credentials)?;

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(bad_credentials());
    }
    if !user.is_active {
        warn!(user_id = %user.id, "login on inactive account");
        return Err(bad_credentials());
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        status: "success",
        token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(email) = payload.email else {
        return Err(AppError::validation("Please provide an email"));
    };
    let email = email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::not_found("The user with this email does not exist"))?;

    let secret = generate_opaque_secret();
    User::set_reset_token(
        &state.db,
        user.id,
        &hash_secret(&secret),
        OffsetDateTime::now_utc() + RESET_TOKEN_TTL,
    )
    .await?;

    let reset_url = format!(
        "{}/api/v1/users/resetpassword/{}",
        state.config.mail.public_base_url, secret
    );
    mailer::dispatch(
        &state,
        mailer::password_reset_email(&user.full_name, &user.email, &reset_url),
    );

    info!(user_id = %user.id, "password reset token issued");
    Ok(Json(MessageResponse {
        status: "success",
        message: "Token sent to mail",
    }))
}

#[instrument(skip(state, payload, token))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, AppError> {
    let user = User::find_by_reset_token(&state.db, &hash_secret(&token))
        .await?
        .ok_or_else(|| AppError::invalid_token("Token is invalid or has expired"))?;

    if !password_long_enough(&payload.password) {
        return Err(AppError::validation(
            "Password must have at least 8 characters",
        ));
    }
    if payload.password != payload.password_confirm {
        return Err(AppError::validation("Password must be the same"));
    }
    if verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::validation(
            "New password cannot be the same as old password",
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::apply_password_reset(&state.db, user.id, &password_hash).await?;

    // Tokens issued before this point are now dead; hand the client a fresh one.
    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, "password reset completed");
    Ok(Json(ResetPasswordResponse {
        status: "success",
        token,
        message: "Password Changed Successfully",
    }))
}

#[instrument(skip(state, token))]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let user = User::find_by_verification_token(&state.db, &hash_secret(&token))
        .await?
        .ok_or_else(|| AppError::invalid_token("Token is invalid or has expired"))?;

    User::mark_verified(&state.db, user.id).await?;

    info!(user_id = %user.id, "email verified via link");
    Ok(Json(MessageResponse {
        status: "success",
        message: "Email verified successfully",
    }))
}

#[instrument(skip(state, current, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(otp_value) = payload.otp.filter(|v| !v.trim().is_empty()) else {
        return Err(AppError::validation("Provide OTP details"));
    };
    let user_id = payload.user.unwrap_or(current.0.id);

    let record = Otp::find_latest_active(&state.db, user_id).await?;
    if let Err(err) = check_otp(record.as_ref(), otp_value.trim()) {
        warn!(%user_id, "otp rejected");
        return Err(err);
    }

    Otp::delete_for_user(&state.db, user_id).await?;
    User::mark_verified(&state.db, user_id).await?;

    info!(%user_id, "email verified via otp");
    Ok(Json(MessageResponse {
        status: "success",
        message: "User email verified successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_common_addresses() {
        assert!(is_valid_email("legend@x.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_malformed() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        // "pässwör" is 7 characters but 9 bytes.
        assert!(!password_long_enough("pässwör"));
        assert!(password_long_enough("pässwörd"));
        assert!(!password_long_enough("1234567"));
        assert!(password_long_enough("12345678"));
    }

    fn otp_record(value: &str) -> Otp {
        Otp {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            otp_hash: hash_password(value).unwrap(),
            expires_at: time::OffsetDateTime::now_utc() + time::Duration::minutes(10),
            created_at: time::OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn matching_otp_passes() {
        let record = otp_record("482913");
        assert!(check_otp(Some(&record), "482913").is_ok());
    }

    #[test]
    fn wrong_otp_is_rejected() {
        let record = otp_record("482913");
        let err = check_otp(Some(&record), "000000").unwrap_err();
        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::UNAUTHORIZED,
            "{err}"
        );
    }

    #[test]
    fn missing_otp_record_is_rejected() {
        // Purged or never issued, the verification must fail either way, so a
        // code cannot be replayed after the rows for the user are deleted.
        let err = check_otp(None, "482913").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
