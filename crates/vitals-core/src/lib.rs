//! vitals core: the endpoint catalogue, the simulation rules that decide each
//! endpoint's delay and failure, and the error surface shared by the service
//! and the traffic driver.
//!
//! This crate carries no HTTP or runtime dependencies. Sampling takes any
//! `rand::Rng`, so callers pick the randomness source (thread-local in
//! production, seeded in tests).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod profile;

/// Shared result type.
pub use error::{Result, VitalsError};
pub use profile::{Detail, Endpoint, ErrorKind, Plan};
