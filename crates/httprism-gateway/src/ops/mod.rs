//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining)
//! - `/metrics` : exposition, encoding negotiated from `Accept`

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use httprism_core::exposition::{self, Encoding};

use crate::app_state::AppState;
use crate::obs::HandlerName;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

/// Serialize the whole registry. Always 200; an unreadable or unknown
/// `Accept` falls back to the text format.
pub async fn metrics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    let encoding = Encoding::negotiate(accept);
    tracing::debug!(?encoding, accept = ?accept, "metrics scrape");

    let body = exposition::encode(state.registry(), encoding);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoding.content_type())],
        body,
    )
        .into_response()
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Extension(HandlerName("NotFoundHandler")),
        "not found",
    )
}
