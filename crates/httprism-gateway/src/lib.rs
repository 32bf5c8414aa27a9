//! httprism gateway library entry.
//!
//! This crate hosts the core request metrics inside an axum server: config
//! loading, the tracking middleware, ops endpoints, and router wiring. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
