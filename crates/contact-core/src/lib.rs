//! # contact-core
//!
//! Contact form pipeline for the agency landing page.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Submission pipeline                        │
//! │  ┌────────────┐   ┌─────────────────┐   ┌──────────────────┐  │
//! │  │  validate  │──▶│ SubmissionStore │──▶│     Notifier     │  │
//! │  │  (pure)    │   │  (append-only)  │   │  (best-effort)   │  │
//! │  └────────────┘   └─────────────────┘   └──────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation and persistence errors reach the caller. Notification failures
//! never do: the `Notifier` logs them and moves on.

pub mod error;
pub mod model;
pub mod notify;
pub mod store;
pub mod validation;

pub use error::{ContactError, Result};
pub use model::{ContactSubmission, NewSubmission, ServiceCategory, SubmissionId};
pub use notify::{MailTransport, Notification, Notifier, NotifyOutcome};
pub use store::{JsonlSubmissionStore, MemorySubmissionStore, SubmissionStore};
pub use validation::validate;
