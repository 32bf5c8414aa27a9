//! httprism gateway
//!
//! Demo host: serves a single `MainHandler` route with request metrics,
//! `/healthz`, `/readyz` and the metrics endpoint.
//!
//! Usage: `httprism-gateway [config.yaml]` (default `httprism.yaml`).

use axum::{routing::get, Router};
use tracing_subscriber::{fmt, EnvFilter};

use httprism_gateway::app_state::AppState;
use httprism_gateway::obs::named;
use httprism_gateway::{config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // Bad config or metric schema is fatal: refuse to start.
    let path = std::env::args().nth(1).unwrap_or_else(|| "httprism.yaml".into());
    let cfg = config::load_from_file(&path).expect("config load failed");
    let listen = cfg.gateway.listen_addr().expect("gateway.listen must be a valid SocketAddr");

    let state = AppState::new(cfg).expect("metrics setup failed");
    let app = router::build_router(state.clone(), host_routes());

    tracing::info!(%listen, metrics = %state.cfg().metrics.path, "httprism-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("server failed");
}

fn host_routes() -> Router<AppState> {
    Router::new().route("/", named("MainHandler", get(|| async { "Hello, world" })))
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    state.set_draining();
    tracing::info!("shutdown requested, draining");
}
