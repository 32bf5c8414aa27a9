//! Top-level facade crate for httprism.
//!
//! Re-exports the core aggregates and the axum gateway so users can depend on a single crate.

pub mod core {
    pub use httprism_core::*;
}

pub mod gateway {
    pub use httprism_gateway::*;
}
