//! Request targets the driver picks from.

use std::fmt;

/// Default service base URL; target paths are appended to it.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/app";

/// One request shape: method plus path (with query string) under the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub method: &'static str,
    pub path: &'static str,
}

impl Target {
    pub const fn get(path: &'static str) -> Self {
        Self { method: "GET", path }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Every target, in the order single-pass mode visits them.
pub static TARGETS: [Target; 10] = [
    Target::get("/"),
    Target::get("/user/profile/"),
    Target::get("/search/?q=python"),
    Target::get("/search/?q=django"),
    Target::get("/search/?q=error"),
    Target::get("/compute/"),
    Target::get("/upload/"),
    Target::get("/analytics/"),
    Target::get("/health/"),
    Target::get("/loadtest/"),
];

/// Targets able to produce a simulated failure.
pub static ERROR_TARGETS: [Target; 4] = [
    Target::get("/search/?q=error"),
    Target::get("/compute/"),
    Target::get("/upload/"),
    Target::get("/user/profile/"),
];
