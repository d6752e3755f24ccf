use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Otp, Role, User};

const USER_COLS: &str = "id, full_name, email, password_hash, role, profile_photo, bio, gender, \
     fitness_goal, is_active, is_verified, password_changed_at, password_reset_token, \
     password_reset_expires, email_verification_token, email_verification_expires, created_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(
        db: &PgPool,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        let sql = format!(
            "INSERT INTO users (full_name, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING {USER_COLS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(full_name)
            .bind(email)
            .bind(password_hash)
            .fetch_one(db)
            .await
    }

    /// Single atomic update; a newer reset request overwrites the previous
    /// token so at most one is live per user.
    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires: OffsetDateTime,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE users SET password_reset_token = $2, password_reset_expires = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Lookup by reset-token digest; expired tokens are filtered out here
    /// rather than purged eagerly.
    pub async fn find_by_reset_token(db: &PgPool, token_hash: &str) -> sqlx::Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLS} FROM users \
             WHERE password_reset_token = $1 AND password_reset_expires > now()"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .fetch_optional(db)
            .await
    }

    /// Sets the new password and clears the reset token in one update.
    /// `password_changed_at` is backdated 1 second so the session token
    /// issued right after the reset is not itself invalidated.
    pub async fn apply_password_reset(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        let sql = format!(
            "UPDATE users SET password_hash = $2, \
                 password_changed_at = now() - interval '1 second', \
                 password_reset_token = NULL, password_reset_expires = NULL \
             WHERE id = $1 RETURNING {USER_COLS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_one(db)
            .await
    }

    pub async fn set_verification_token(
        db: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires: OffsetDateTime,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE users SET email_verification_token = $2, email_verification_expires = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn find_by_verification_token(
        db: &PgPool,
        token_hash: &str,
    ) -> sqlx::Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLS} FROM users \
             WHERE email_verification_token = $1 AND email_verification_expires > now()"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .fetch_optional(db)
            .await
    }

    pub async fn mark_verified(db: &PgPool, id: Uuid) -> sqlx::Result<User> {
        let sql = format!(
            "UPDATE users SET is_verified = TRUE, \
                 email_verification_token = NULL, email_verification_expires = NULL \
             WHERE id = $1 RETURNING {USER_COLS}"
        );
        sqlx::query_as::<_, User>(&sql).bind(id).fetch_one(db).await
    }

    pub async fn set_role(db: &PgPool, id: Uuid, role: Role) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        gender: Option<&str>,
        fitness_goal: Option<&[String]>,
    ) -> sqlx::Result<User> {
        let sql = format!(
            "UPDATE users SET gender = COALESCE($2, gender), \
                 fitness_goal = COALESCE($3, fitness_goal) \
             WHERE id = $1 RETURNING {USER_COLS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(gender)
            .bind(fitness_goal)
            .fetch_one(db)
            .await
    }
}

impl Otp {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        otp_hash: &str,
        expires: OffsetDateTime,
    ) -> sqlx::Result<Otp> {
        sqlx::query_as::<_, Otp>(
            "INSERT INTO otps (user_id, otp_hash, expires_at) VALUES ($1, $2, $3) \
             RETURNING id, user_id, otp_hash, created_at, expires_at",
        )
        .bind(user_id)
        .bind(otp_hash)
        .bind(expires)
        .fetch_one(db)
        .await
    }

    pub async fn find_latest_active(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<Otp>> {
        sqlx::query_as::<_, Otp>(
            "SELECT id, user_id, otp_hash, created_at, expires_at FROM otps \
             WHERE user_id = $1 AND expires_at > now() \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// OTPs are single-use; one successful verification invalidates every
    /// outstanding code for the user.
    pub async fn delete_for_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM otps WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
