//! vitals service
//!
//! Simulated endpoints under `/app/`, Prometheus metrics on `/metrics`.
//! Config path: first CLI argument, else `VITALS_CONFIG`, else `vitals.yaml`.

use tracing_subscriber::{fmt, EnvFilter};

use vitals_core::error::Result;
use vitals_service::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::resolve(std::env::args().nth(1))?;
    let state = app_state::AppState::new(cfg);
    let listen = state.cfg().service.listen_addr()?;
    let seeded = state.cfg().service.seed.is_some();
    let app = router::build_router(state);

    tracing::info!(%listen, seeded, "vitals-service starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("vitals-service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
