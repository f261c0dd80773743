//! Server Configuration

use std::path::PathBuf;
use std::time::Duration;

use contact_core::notify::{DEFAULT_RECIPIENT, DEFAULT_TIMEOUT};
use contact_core::{ContactError, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,

    /// Built landing page, served for any non-API path
    pub static_dir: PathBuf,

    /// Operator mailbox that receives notifications
    pub recipient: String,

    /// Upper bound on a single notification attempt
    pub notify_timeout: Duration,

    /// JSON-lines file for durable storage (in-memory when unset)
    pub submissions_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            static_dir: DEFAULT_STATIC_DIR.into(),
            recipient: DEFAULT_RECIPIENT.into(),
            notify_timeout: DEFAULT_TIMEOUT,
            submissions_file: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let notify_timeout = match var("NOTIFY_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| {
                    ContactError::Config(format!("NOTIFY_TIMEOUT_SECS is not a number: {e}"))
                })?,
            None => defaults.notify_timeout,
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: var("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            // Recipient, despite the variable name
            recipient: var("FROM_EMAIL").unwrap_or(defaults.recipient),
            notify_timeout,
            submissions_file: var("SUBMISSIONS_FILE").map(PathBuf::from),
        })
    }
}
