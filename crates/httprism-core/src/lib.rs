//! httprism core: metric aggregates, status classification, request
//! observation and exposition encodings.
//!
//! This crate carries no HTTP server dependency. The host framework feeds
//! completed requests into a [`observe::RequestObserver`] and serves
//! [`exposition::encode`] output from its metrics route.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Metrics must never bring down the request path, so every fallible
//! operation surfaces as `HttPrismError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod metrics;
pub mod observe;

/// Shared result type.
pub use error::{HttPrismError, Result};
