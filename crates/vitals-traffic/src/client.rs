//! Request issuance.
//!
//! A [`Transport`] never fails: network errors come back as an [`Outcome`]
//! with status 0 so a session can carry on.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Method;

use vitals_core::error::{Result, VitalsError};

use crate::target::Target;

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one request. Printed, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub method: &'static str,
    pub path: &'static str,
    /// HTTP status, or 0 when no response was received.
    pub status: u16,
    pub elapsed: Duration,
    /// Transport failure description (status 0 only).
    pub error: Option<String>,
}

impl Outcome {
    pub fn response(target: &Target, status: u16, elapsed: Duration) -> Self {
        Self {
            method: target.method,
            path: target.path,
            status,
            elapsed,
            error: None,
        }
    }

    pub fn transport_error(target: &Target, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            method: target.method,
            path: target.path,
            status: 0,
            elapsed,
            error: Some(error.into()),
        }
    }

    /// Success means a response with status below 400.
    pub fn is_success(&self) -> bool {
        self.status != 0 && self.status < 400
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, target: &Target) -> Outcome;
}

/// `reqwest`-backed transport against a base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VitalsError::Internal(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, target: &Target) -> String {
        format!("{}{}", self.base_url, target.path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, target: &Target) -> Outcome {
        let started = Instant::now();

        let method = match Method::from_bytes(target.method.as_bytes()) {
            Ok(m) => m,
            Err(e) => return Outcome::transport_error(target, e.to_string(), started.elapsed()),
        };

        match self.client.request(method, self.url(target)).send().await {
            Ok(resp) => Outcome::response(target, resp.status().as_u16(), started.elapsed()),
            Err(e) => {
                tracing::debug!(request = %target, error = %e, "request failed");
                Outcome::transport_error(target, e.to_string(), started.elapsed())
            }
        }
    }
}
