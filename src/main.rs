//! DAO Governance API - Proposal registry with weighted voting
//!
//! Members create proposals, vote on them while the voting window is open,
//! and the owner finalizes each proposal once voting has closed by checking
//! its tally against a quorum threshold.
//!
//! VOTING POWER: Either one vote per member (simple mode) or the member's
//! governance token balance (weighted mode). Members may delegate their
//! voting power to another address.

mod auth;
mod config;
mod error;
mod extract;
mod governance;
mod models;
mod routes;
mod state;
mod token;

use crate::config::Settings;
use crate::governance::SystemClock;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting DAO Governance API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    let state = Arc::new(AppState::new(&settings.governance, Arc::new(SystemClock))?);
    info!(
        "🗳️  {} ({}) in {:?} mode, {} members, owner {}",
        state.ledger.name(),
        state.ledger.symbol(),
        state.ledger.mode(),
        state.registry.membership().len(),
        state.registry.membership().owner()
    );

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── DAO ───");
    info!("   GET  /api/dao                          - Token and roster overview");
    info!("   POST /api/delegate                     - Delegate voting power");
    info!("   GET  /api/members/{{member}}             - Balance, delegate, voting weight");
    info!("   GET  /api/audit                        - Governance audit trail");
    info!("");
    info!("   ─── Proposals ───");
    info!("   POST /api/proposals                    - Create proposal");
    info!("   GET  /api/proposals                    - List all proposals");
    info!("   GET  /api/proposals/winner             - Proposal with the most votes");
    info!("   GET  /api/proposals/{{id}}               - Get proposal");
    info!("   GET  /api/proposals/{{id}}/remaining     - Seconds left to vote");
    info!("   GET  /api/proposals/{{id}}/voters/{{m}}    - Has member voted");
    info!("   POST /api/proposals/{{id}}/vote          - Vote");
    info!("   POST /api/proposals/{{id}}/execute       - Execute (owner, after deadline)");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dao_governance_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
