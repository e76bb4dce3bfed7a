//! vitals service library entry.
//!
//! Wires config, shared state, the metrics registry and the simulated
//! endpoint handlers into an axum router. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod router;
