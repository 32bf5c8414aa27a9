//! Host-side observation wiring.
//!
//! The axum half of request metrics: middleware that feeds the core
//! `RequestObserver`, and per-route handler naming.

pub mod track;

pub use track::{catch_panic, named, track_requests, HandlerName};
