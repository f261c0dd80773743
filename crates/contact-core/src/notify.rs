//! Submission Notifications
//!
//! Best-effort email to the site operator whenever a submission is stored.
//! The strategy is picked once at startup:
//!
//! ```text
//! credentials present ──▶ Notifier::Transport ──▶ MailTransport::send (bounded by timeout)
//! credentials missing ──▶ Notifier::LogOnly   ──▶ tracing::info! with subject + body
//! ```
//!
//! Neither variant ever returns an error to the caller.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::model::ContactSubmission;

/// Operator mailbox used when none is configured
pub const DEFAULT_RECIPIENT: &str = "thefusionwebsolution@gmail.com";

/// Upper bound on a single delivery attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A rendered notification email
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    /// Submitter's address, so the operator can answer directly
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}

impl Notification {
    pub fn for_submission(submission: &ContactSubmission, to: impl Into<String>) -> Self {
        let html = format!(
            "<h2>New Contact Submission</h2>\n\
             <p><strong>Name:</strong> {name}</p>\n\
             <p><strong>Email:</strong> {email}</p>\n\
             <p><strong>Phone:</strong> {phone}</p>\n\
             <p><strong>Service:</strong> {service}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{message}</p>\n\
             <hr />\n\
             <p>ID: {id}</p>\n\
             <p>Received: {received}</p>\n",
            name = escape(&submission.name),
            email = escape(&submission.email),
            phone = escape_or(submission.phone.as_deref(), "(not provided)"),
            service = escape_or(submission.service_label(), "(not provided)"),
            message = escape_or(submission.message.as_deref(), "(no message)"),
            id = submission.id,
            received = submission.created_at.to_rfc3339(),
        );

        Self {
            to: to.into(),
            reply_to: submission.email.clone(),
            subject: format!("New contact form submission from {}", submission.name),
            html,
        }
    }
}

fn escape(value: &str) -> String {
    ammonia::clean_text(value)
}

fn escape_or(value: Option<&str>, placeholder: &str) -> String {
    value.map_or_else(|| placeholder.to_string(), escape)
}

/// Outbound mail delivery
///
/// Implement this trait to plug in a real mail backend (SMTP, an HTTP API, ...).
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Deliver one notification
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// What happened to a notification. Only ever logged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Handed to the transport successfully
    Delivered,
    /// No transport configured; contents went to the log
    Logged,
    /// Transport failed or timed out; the error was swallowed
    Failed(String),
}

/// Notification strategy
#[derive(Clone)]
pub enum Notifier {
    /// Live delivery through a transport
    Transport {
        transport: Arc<dyn MailTransport>,
        recipient: String,
        timeout: Duration,
    },

    /// Degraded mode: log the message instead of sending it
    LogOnly { recipient: String },
}

impl Notifier {
    pub fn with_transport(
        transport: Arc<dyn MailTransport>,
        recipient: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self::Transport {
            transport,
            recipient: recipient.into(),
            timeout,
        }
    }

    pub fn log_only(recipient: impl Into<String>) -> Self {
        Self::LogOnly {
            recipient: recipient.into(),
        }
    }

    /// Whether a real transport is configured
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn recipient(&self) -> &str {
        match self {
            Self::Transport { recipient, .. } | Self::LogOnly { recipient } => recipient,
        }
    }

    /// Notify the operator about a stored submission
    pub async fn notify(&self, submission: &ContactSubmission) -> NotifyOutcome {
        let notification = Notification::for_submission(submission, self.recipient());

        match self {
            Self::LogOnly { .. } => {
                tracing::info!(
                    id = %submission.id,
                    subject = %notification.subject,
                    html = %notification.html,
                    "Mail transport not configured; notification contents follow"
                );
                NotifyOutcome::Logged
            }
            Self::Transport {
                transport,
                recipient,
                timeout,
            } => match tokio::time::timeout(*timeout, transport.send(&notification)).await {
                Ok(Ok(())) => {
                    tracing::info!(
                        id = %submission.id,
                        transport = transport.name(),
                        "Contact submission emailed to {}",
                        recipient
                    );
                    NotifyOutcome::Delivered
                }
                Ok(Err(e)) => {
                    tracing::error!(id = %submission.id, "Failed to send contact email: {}", e);
                    NotifyOutcome::Failed(e.to_string())
                }
                Err(_) => {
                    tracing::error!(
                        id = %submission.id,
                        "Contact email timed out after {:?}",
                        timeout
                    );
                    NotifyOutcome::Failed(format!("timed out after {timeout:?}"))
                }
            },
        }
    }
}
