//! Notifier implementations
//!
//! `SmtpNotifier` delivers mail through a pooled SMTP transport. SMS goes
//! out through the same port but no carrier integration is wired yet, so
//! messages are logged. `LogNotifier` is the development fallback when no
//! SMTP host is configured.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use warranty_core::{DomainError, Notifier, RepoResult};

use crate::config::SmtpConfig;

/// Notifier delivering email over SMTP
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpNotifier {
    /// Build a notifier from SMTP configuration
    ///
    /// # Errors
    /// Returns an error if the relay address or from header is invalid
    pub fn new(config: &SmtpConfig) -> Result<Self, DomainError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| DomainError::NotificationError(format!("Invalid SMTP relay: {e}")))?
            .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> RepoResult<()> {
        let message = Message::builder()
            .from(self.from.parse().map_err(|e| {
                DomainError::NotificationError(format!("Invalid from address: {e}"))
            })?)
            .to(to
                .parse()
                .map_err(|e| DomainError::NotificationError(format!("Invalid recipient: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| DomainError::NotificationError(format!("Failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DomainError::NotificationError(format!("SMTP send failed: {e}")))?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }

    async fn send_sms(&self, to: &str, body: &str) -> RepoResult<()> {
        // No SMS carrier configured; log with a masked number
        tracing::info!(phone = %mask_phone(to), body_len = body.len(), "SMS dispatch skipped (no carrier configured)");
        Ok(())
    }
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier").field("from", &self.from).finish()
    }
}

/// Development notifier that logs instead of delivering
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_email(&self, to: &str, subject: &str, _html_body: &str) -> RepoResult<()> {
        tracing::info!(to = %to, subject = %subject, "Email send skipped (no SMTP configured)");
        Ok(())
    }

    async fn send_sms(&self, to: &str, body: &str) -> RepoResult<()> {
        tracing::info!(phone = %mask_phone(to), body = %body, "SMS send skipped (no carrier configured)");
        Ok(())
    }
}

/// Keep only the leading digits of a phone number for log output
fn mask_phone(phone: &str) -> String {
    let visible: String = phone.chars().take(4).collect();
    format!("{visible}****")
}
