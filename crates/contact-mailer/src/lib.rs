//! # contact-mailer
//!
//! Mail transports for contact notifications.
//!
//! ## Transports
//!
//! - **SMTP** (default): authenticated relay via lettre, implicit TLS on port
//!   465 and STARTTLS elsewhere
//!
//! ## Usage
//!
//! ```rust,ignore
//! use contact_mailer::{SmtpConfig, SmtpMailer};
//!
//! let config = SmtpConfig::from_env()?;
//! let mailer = SmtpMailer::new(&config, Duration::from_secs(10))?;
//! let notifier = Notifier::with_transport(Arc::new(mailer), recipient, timeout);
//! ```

pub mod config;

#[cfg(feature = "smtp")]
pub mod smtp;

pub use config::SmtpConfig;

#[cfg(feature = "smtp")]
pub use smtp::SmtpMailer;
