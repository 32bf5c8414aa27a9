//! Axum router wiring.
//!
//! Merges the host's routes with the ops endpoints and the metrics route,
//! then wraps everything in the request tracking middleware. The host's
//! router must not define `/healthz`, `/readyz` or the metrics path.

use axum::{middleware, routing::get, Router};

use crate::app_state::AppState;
use crate::obs::{catch_panic, named, track_requests};
use crate::ops;

pub fn build_router(state: AppState, app: Router<AppState>) -> Router {
    let metrics_path = state.cfg().metrics.path.clone();

    app.route(&metrics_path, named("MetricsHandler", get(ops::metrics)))
        .route("/healthz", named("HealthHandler", get(ops::healthz)))
        .route("/readyz", named("ReadyHandler", get(ops::readyz)))
        .fallback(ops::not_found)
        // Panics in unnamed routes become 500s before the tracker sees them.
        .layer(catch_panic())
        // Applied last so it wraps every route above.
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}
