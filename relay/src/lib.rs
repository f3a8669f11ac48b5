pub mod api;
pub mod config;
pub mod errors;
pub mod handler;
pub mod metrics_defs;
pub mod profile;
pub mod upstream;

#[cfg(test)]
mod testutils;

use crate::errors::RelayError;
use crate::handler::ProfileHandler;
use crate::upstream::BotToken;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;

/// Runs the relay and admin listeners until a shutdown signal arrives.
///
/// The admin `/ready` probe reports ready once the relay listener is bound and
/// flips back as soon as shutdown starts draining requests.
pub async fn run(config: config::Config, token: Option<BotToken>) -> Result<(), RelayError> {
    config.validate()?;
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    if token.is_none() {
        tracing::warn!(
            env = %config.upstream.token_env,
            "No bot token configured, upstream requests will be unauthenticated"
        );
    }

    let handler = ProfileHandler::new(&config, token)?;

    let ready = Arc::new(AtomicBool::new(false));

    let listener = TcpListener::bind(config.listener.addr()).await?;
    tracing::info!(addr = %config.listener.addr(), "Profile relay listening");
    ready.store(true, Ordering::Relaxed);

    let is_ready = ready.clone();
    let admin_service = AdminService::<_, RelayError>::new(move || is_ready.load(Ordering::Relaxed));
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin_service,
    );

    let relay_task = async move {
        axum::serve(listener, api::router(handler))
            .with_graceful_shutdown(shutdown_signal(ready))
            .await
    };

    tokio::select! {
        result = relay_task => result?,
        result = admin_task => result?,
    }

    tracing::info!("Profile relay stopped");
    Ok(())
}

async fn shutdown_signal(ready: Arc<AtomicBool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    ready.store(false, Ordering::Relaxed);
    tracing::info!("Shutdown signal received, draining in-flight requests");
}
