//! Application State

use std::sync::Arc;

use contact_core::{Notifier, SubmissionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Append-only submission store, built once at startup
    pub store: Arc<dyn SubmissionStore>,

    /// Notification strategy (live transport or log-only)
    pub notifier: Arc<Notifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn SubmissionStore>, notifier: Notifier) -> Self {
        Self {
            store,
            notifier: Arc::new(notifier),
        }
    }
}
