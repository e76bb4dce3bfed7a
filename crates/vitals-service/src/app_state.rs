//! Shared application state for the vitals service.
//!
//! Holds the metrics registry and the randomness source every endpoint samples
//! from. Both are created once at startup and injected into handlers through
//! axum's `State`.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;

use vitals_core::profile::{Endpoint, Plan};

use crate::config::ServiceConfig;
use crate::obs::MetricsRegistry;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<MetricsRegistry>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    rng: Mutex<StdRng>,
}

impl AppState {
    pub fn new(cfg: ServiceConfig) -> Self {
        let rng = match cfg.service.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                rng: Mutex::new(rng),
            }),
            metrics: Arc::new(MetricsRegistry::with_service_families()),
        }
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    /// Sample one plan for `endpoint`. The RNG lock is held only for the draw.
    pub fn sample(&self, endpoint: Endpoint, query: Option<&str>) -> Plan {
        let mut rng = self
            .inner
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        endpoint.sample(&mut *rng, query)
    }
}
