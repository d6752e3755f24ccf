use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Transactional email API endpoint (Brevo-style JSON API).
    pub api_url: String,
    pub api_key: String,
    pub from_name: String,
    pub from_email: String,
    /// Base URL used for reset/verification links embedded in emails.
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "coachx".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "coachx-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 7),
        };
        let mail = MailConfig {
            api_url: std::env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "https://api.brevo.com/v3/smtp/email".into()),
            api_key: std::env::var("MAIL_API_KEY").unwrap_or_default(),
            from_name: std::env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "CoachX".into()),
            from_email: std::env::var("MAIL_FROM_EMAIL")
                .unwrap_or_else(|_| "no-reply@coachx.dev".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
        };
        Ok(Self {
            database_url,
            environment,
            jwt,
            mail,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
