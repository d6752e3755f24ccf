use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::config::MailConfig;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to_name: String,
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

/// Email delivery abstraction. Account flows never depend on delivery
/// succeeding; see [`dispatch`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Sender backed by a Brevo-style transactional email JSON API.
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let payload = json!({
            "sender": { "name": self.config.from_name, "email": self.config.from_email },
            "to": [{ "name": message.to_name, "email": message.to_email }],
            "subject": message.subject,
            "textContent": message.body,
        });
        let resp = self
            .client
            .post(&self.config.api_url)
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("mail api returned {}", resp.status());
        }
        Ok(())
    }
}

/// Local dev sender that logs the message instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        info!(
            to = %message.to_email,
            subject = %message.subject,
            body = %message.body,
            "mail send stub"
        );
        Ok(())
    }
}

/// Fire-and-forget dispatch. Delivery failures are logged and never reach
/// the calling handler.
pub fn dispatch(state: &AppState, message: EmailMessage) {
    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&message).await {
            warn!(error = %e, to = %message.to_email, "email dispatch failed");
        }
    });
}

pub fn welcome_email(to_name: &str, to_email: &str, otp: &str, verify_url: &str) -> EmailMessage {
    let first_name = to_name.split_whitespace().next().unwrap_or(to_name);
    EmailMessage {
        to_name: to_name.to_string(),
        to_email: to_email.to_string(),
        subject: "Welcome to CoachX Family".into(),
        body: format!(
            "Hi {first_name},\n\nYour CoachX verification code is {otp}. \
             It expires in 10 minutes.\n\nYou can also verify your email here: {verify_url}\n"
        ),
    }
}

pub fn password_reset_email(to_name: &str, to_email: &str, reset_url: &str) -> EmailMessage {
    let first_name = to_name.split_whitespace().next().unwrap_or(to_name);
    EmailMessage {
        to_name: to_name.to_string(),
        to_email: to_email.to_string(),
        subject: "Reset your Password".into(),
        body: format!(
            "Hi {first_name},\n\nForgot your password? Submit a PATCH request with your new \
             password to: {reset_url}\n\nThis link expires in 10 minutes. If you didn't ask \
             for a reset, ignore this email.\n"
        ),
    }
}

pub fn waitlist_email(to_name: &str, to_email: &str) -> EmailMessage {
    EmailMessage {
        to_name: to_name.to_string(),
        to_email: to_email.to_string(),
        subject: "You're in. Welcome to CoachX.".into(),
        body: format!("Hi {to_name},\n\nYou're on the CoachX waitlist. Big things are coming.\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer;
        let msg = EmailMessage {
            to_name: "Legend".into(),
            to_email: "legend@x.com".into(),
            subject: "hi".into(),
            body: "body".into(),
        };
        assert!(mailer.send(&msg).await.is_ok());
    }

    #[test]
    fn welcome_email_contains_otp_and_url() {
        let msg = welcome_email("Legend User", "legend@x.com", "123456", "https://x/verify/abc");
        assert!(msg.body.contains("123456"));
        assert!(msg.body.contains("https://x/verify/abc"));
        assert!(msg.body.contains("Hi Legend,"));
    }

    #[test]
    fn reset_email_contains_url() {
        let msg = password_reset_email("Legend", "legend@x.com", "https://x/reset/tok");
        assert!(msg.body.contains("https://x/reset/tok"));
    }
}
