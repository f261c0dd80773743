//! Submission Records
//!
//! A [`NewSubmission`] is what the validator produces; the store turns it into
//! an immutable [`ContactSubmission`] by assigning an id and a timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique submission identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated form data, not yet persisted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
}

/// A persisted contact form entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: SubmissionId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// Stamp a validated submission with its identity
    pub fn from_new(new: NewSubmission, id: SubmissionId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            service: new.service,
            message: new.message,
            created_at,
        }
    }

    /// Human label for the requested service, if any
    pub fn service_label(&self) -> Option<&str> {
        self.service.as_deref().map(|raw| {
            ServiceCategory::parse(raw).map_or(raw, |category| category.label())
        })
    }
}

/// Service categories offered on the contact form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceCategory {
    Website,
    App,
    Marketing,
    FullStack,
    Other,
}

impl ServiceCategory {
    pub const ALL: [Self; 5] = [
        Self::Website,
        Self::App,
        Self::Marketing,
        Self::FullStack,
        Self::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::App => "app",
            Self::Marketing => "marketing",
            Self::FullStack => "full-stack",
            Self::Other => "other",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Website => "Website Development",
            Self::App => "Mobile App Development",
            Self::Marketing => "Digital Marketing",
            Self::FullStack => "Full-Stack Solution",
            Self::Other => "Other",
        }
    }

    /// Match a form value, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
    }
}
