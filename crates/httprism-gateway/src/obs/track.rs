//! Request tracking middleware.
//!
//! Wraps every route (including the fallback) and reports each completed
//! response to the app's `RequestHook` exactly once. Timing runs from
//! middleware entry to the moment the response head is produced; the hook
//! is synchronous and lock-bounded, so it does not hold up the response.
//!
//! Handler panics are turned into 500 responses below the tracking layer,
//! so they are still counted as `5xx`.

use std::any::Any;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use httprism_core::observe::CompletedRequest;
use tower_http::catch_panic::CatchPanicLayer;

use crate::app_state::AppState;

/// Handler identity reported in the `handler` label.
///
/// Set as a response extension, either per route via [`named`] or by a
/// handler returning `Extension(HandlerName(..))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerName(pub &'static str);

type PanicResponder = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer converting a handler panic into a logged 500.
pub fn catch_panic() -> CatchPanicLayer<PanicResponder> {
    CatchPanicLayer::custom(panic_response as PanicResponder)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".into());
    tracing::error!(panic = %detail, "handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}

/// Tag every response of `route` with `name`, including the 500 produced
/// when its handler panics.
pub fn named<S>(name: &'static str, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route
        .layer(catch_panic())
        .layer(middleware::map_response(move |mut res: Response| async move {
            res.extensions_mut().insert(HandlerName(name));
            res
        }))
}

pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = method_label(req.method());
    let matched = req.extensions().get::<MatchedPath>().cloned();

    let res = next.run(req).await;

    // Route paths are bounded by the routing table, so they are a safe
    // fallback label.
    let handler = res
        .extensions()
        .get::<HandlerName>()
        .map(|h| h.0)
        .or_else(|| matched.as_ref().map(MatchedPath::as_str))
        .unwrap_or("unknown");

    state.request_hook().on_request_complete(&CompletedRequest {
        handler,
        method,
        elapsed: start.elapsed(),
        status: i32::from(res.status().as_u16()),
    });

    res
}

/// Standard methods map to themselves; extension methods collapse to
/// `OTHER`.
fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => "OTHER",
    }
}
