use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::{Role, User};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub password_confirm: String,
}

/// OTP check for the logged-in user, or an explicitly named one.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: Option<String>,
    pub user: Option<Uuid>,
}

/// User document as returned to clients. Field casing follows the API
/// contract: camelCase except `is_verified`. The password hash has no field
/// here at all.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub profile_photo: String,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub fitness_goal: Vec<String>,
    #[serde(rename = "is_verified")]
    pub is_verified: bool,
}

impl From<User> for UserPayload {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            role: u.role,
            profile_photo: u.profile_photo,
            bio: u.bio,
            gender: u.gender,
            fitness_goal: u.fitness_goal,
            is_verified: u.is_verified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: UserPayload,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub status: &'static str,
    pub token: String,
    pub data: UserData,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub status: &'static str,
    pub token: String,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Legend".into(),
            email: "legend@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::User,
            profile_photo: "default.jpg".into(),
            bio: None,
            gender: None,
            fitness_goal: vec!["muscle_gain".into()],
            is_active: true,
            is_verified: false,
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            email_verification_token: None,
            email_verification_expires: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn user_payload_never_contains_password() {
        let json = serde_json::to_string(&UserPayload::from(sample_user())).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn user_payload_field_casing() {
        let json = serde_json::to_string(&UserPayload::from(sample_user())).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"fitnessGoal\""));
        assert!(json.contains("\"is_verified\""));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn signup_request_accepts_camel_case() {
        let body = r#"{"fullName":"Legend","email":"legend@x.com",
                       "password":"StrongPass123!","passwordConfirm":"StrongPass123!"}"#;
        let req: SignupRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.full_name, "Legend");
        assert_eq!(req.password, req.password_confirm);
    }
}
