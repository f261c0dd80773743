//! Contact form HTTP server
//!
//! Axum-based backend for the agency landing page: accepts contact form
//! submissions, stores them and notifies the operator by email.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contact_core::{JsonlSubmissionStore, MemorySubmissionStore, Notifier, SubmissionStore};
use contact_mailer::{SmtpConfig, SmtpMailer};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Initialize storage
    let store: Arc<dyn SubmissionStore> = match &config.submissions_file {
        Some(path) => {
            let store = JsonlSubmissionStore::open(path)?;
            tracing::info!(
                "✓ Persisting submissions to {} ({} loaded)",
                store.path().display(),
                store.count()?
            );
            Arc::new(store)
        }
        None => {
            tracing::warn!("⚠ SUBMISSIONS_FILE not set - submissions kept in memory only");
            Arc::new(MemorySubmissionStore::new())
        }
    };

    // Initialize notifications
    let notifier = build_notifier(&config);

    let state = AppState::new(store, notifier);

    let static_dir = config.static_dir.is_dir().then_some(config.static_dir.as_path());
    if static_dir.is_none() {
        tracing::warn!(
            "⚠ Static directory {} not found - serving API only",
            config.static_dir.display()
        );
    }

    let app = routes::build(state, static_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 contact server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                  - Health check");
    tracing::info!("  POST /api/contact             - Submit contact form");
    tracing::info!("  GET  /api/contact/submissions - List submissions");
    tracing::info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("contact server stopped");
    Ok(())
}

/// Pick the notification strategy once. Missing or unusable SMTP settings
/// fall back to logging the message contents.
fn build_notifier(config: &ServerConfig) -> Notifier {
    let mailer = SmtpConfig::from_env()
        .and_then(|smtp| SmtpMailer::new(&smtp, config.notify_timeout));

    match mailer {
        Ok(mailer) => {
            tracing::info!(
                "✓ SMTP configured via {} - notifying {}",
                mailer.host(),
                config.recipient
            );
            Notifier::with_transport(Arc::new(mailer), &config.recipient, config.notify_timeout)
        }
        Err(e) => {
            tracing::warn!("⚠ SMTP not configured - notifications will be logged only");
            tracing::warn!("  {}", e);
            tracing::warn!("  Set SMTP_HOST, SMTP_PORT, SMTP_USER and SMTP_PASS in .env");
            Notifier::log_only(&config.recipient)
        }
    }
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => tracing::warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received; starting graceful shutdown");
}
