//! HTTP boundary for the reminder path.
//!
//! One endpoint, `POST /api/send-email`, composes and delivers a single
//! reminder. `GET /health` reports liveness.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{RenewalError, Result};
use crate::reminder::{MailTransport, ReminderComposer};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<ReminderComposer>,
    pub transport: Arc<dyn MailTransport>,
}

impl AppState {
    pub fn new(composer: ReminderComposer, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            composer: Arc::new(composer),
            transport,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/send-email", post(handlers::send_email))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Serve until the process is interrupted.
pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| RenewalError::Config(format!("invalid listen address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Reminder API listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down reminder API");
        })
        .await?;

    Ok(())
}
