//! SMTP Mail Transport
//!
//! Implementation of `MailTransport` on top of lettre's async SMTP client.

use std::time::Duration;

use async_trait::async_trait;
use contact_core::{ContactError, MailTransport, Notification, Result};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

/// SMTP mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
}

impl SmtpMailer {
    /// Build a mailer. No connection is made until the first send.
    pub fn new(config: &SmtpConfig, timeout: Duration) -> Result<Self> {
        let builder = if config.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| ContactError::Config(format!("SMTP relay {}: {e}", config.host)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        let from = parse_mailbox("sender", config.sender()).map_err(|e| match e {
            ContactError::Notification(msg) => ContactError::Config(msg),
            other => other,
        })?;

        tracing::debug!(
            host = %config.host,
            port = config.port,
            implicit_tls = config.implicit_tls(),
            "SMTP transport configured"
        );

        Ok(Self {
            transport,
            from,
            host: config.host.clone(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Render a notification as a MIME message
    pub fn build_message(&self, notification: &Notification) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox("recipient", &notification.to)?)
            .reply_to(parse_mailbox("reply-to", &notification.reply_to)?)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(notification.html.clone())
            .map_err(|e| ContactError::Notification(format!("Invalid message: {e}")))
    }
}

fn parse_mailbox(role: &str, address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| ContactError::Notification(format!("Invalid {role} address '{address}': {e}")))
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let message = self.build_message(notification)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| ContactError::Notification(format!("SMTP {}: {e}", self.host)))?;

        tracing::debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contact_core::{ContactSubmission, NewSubmission, SubmissionId};

    fn config(port: u16) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            port,
            username: "mailer@example.com".into(),
            password: "secret".into(),
            from: None,
        }
    }

    fn notification() -> Notification {
        let submission = ContactSubmission::from_new(
            NewSubmission {
                name: "Ann".into(),
                email: "ann@x.com".into(),
                phone: None,
                service: Some("website".into()),
                message: Some("hi".into()),
            },
            SubmissionId::generate(),
            Utc::now(),
        );
        Notification::for_submission(&submission, "ops@example.com")
    }

    #[tokio::test]
    async fn test_message_headers() {
        let mailer = SmtpMailer::new(&config(587), Duration::from_secs(5)).unwrap();
        assert_eq!(mailer.host(), "smtp.example.com");

        let message = mailer.build_message(&notification()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: mailer@example.com"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("Reply-To: ann@x.com"));
        assert!(raw.contains("Subject: New contact form submission from Ann"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_implicit_tls_port_builds() {
        assert!(SmtpMailer::new(&config(465), Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_bad_sender_is_config_error() {
        let mut config = config(587);
        config.username = "not an address".into();
        assert!(matches!(
            SmtpMailer::new(&config, Duration::from_secs(5)),
            Err(ContactError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_recipient_is_notification_error() {
        let mailer = SmtpMailer::new(&config(587), Duration::from_secs(5)).unwrap();
        let mut notification = notification();
        notification.to = "nobody".into();
        assert!(matches!(
            mailer.build_message(&notification),
            Err(ContactError::Notification(_))
        ));
    }
}
