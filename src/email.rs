use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpConfig;

/// Outbound mail seam; swapped for a recording fake in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_reset_email(&self, to: &str, token: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    reset_url_base: String,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = if cfg.username.is_empty() {
            // Unauthenticated relay, local dev only.
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host)
                .port(cfg.port)
                .build()
        } else {
            let creds = Credentials::new(cfg.username.clone(), cfg.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)?
                .port(cfg.port)
                .credentials(creds)
                .build()
        };
        Ok(Self {
            transport,
            from_address: cfg.from_address.clone(),
            reset_url_base: cfg.reset_url_base.clone(),
        })
    }
}

fn reset_url(base: &str, token: &str) -> String {
    format!("{}/reset-password?token={}", base.trim_end_matches('/'), token)
}

fn build_reset_message(from: &str, to: &str, reset_url: &str) -> anyhow::Result<Message> {
    let body = format!(
        r#"We received a request to reset your password.

Click the link below to choose a new password:

{}

The link is valid for one hour.

If you did not request this, you can safely ignore this email.

---
QuizCampus
"#,
        reset_url
    );

    let message = Message::builder()
        .from(from.parse()?)
        .to(to.parse()?)
        .subject("Password reset request - QuizCampus")
        .header(ContentType::TEXT_PLAIN)
        .body(body)?;
    Ok(message)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_reset_email(&self, to: &str, token: &str) -> anyhow::Result<()> {
        let url = reset_url(&self.reset_url_base, token);
        let message = build_reset_message(&self.from_address, to, &url)?;
        self.transport.send(message).await?;
        info!(to = %to, "password reset email sent");
        Ok(())
    }
}
