//! SMTP Configuration
//!
//! All four of `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER` and `SMTP_PASS` must be
//! present (and the port must parse) for live delivery. Anything less is a
//! `Config` error, which the server treats as "run in degraded mode".

use contact_core::{ContactError, Result};

/// Port that speaks TLS from the first byte; every other port uses STARTTLS
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP connection settings
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,

    /// Sender address (defaults to the username)
    pub from: Option<String>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .finish()
    }
}

impl SmtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &str| {
            var(key).ok_or_else(|| ContactError::Config(format!("{key} not set")))
        };

        let host = required("SMTP_HOST")?;
        let port = required("SMTP_PORT")?
            .parse::<u16>()
            .map_err(|e| ContactError::Config(format!("SMTP_PORT is not a valid port: {e}")))?;
        let username = required("SMTP_USER")?;
        let password = required("SMTP_PASS")?;

        Ok(Self {
            host,
            port,
            username,
            password,
            from: var("SMTP_FROM"),
        })
    }

    pub const fn implicit_tls(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }

    /// Address used in the `From` header
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }
}
