//! Traffic session modes.
//!
//! Single-pass, continuous and error-scenario sessions are one sequential
//! stream: each request completes (or times out) before the next is sent.
//! Burst sessions fan out to a group of worker tasks and only finish once
//! every worker has been joined.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};

use vitals_core::error::{Result, VitalsError};

use crate::client::{Outcome, Transport};
use crate::report::{Event, Reporter};
use crate::target::{Target, ERROR_TARGETS, TARGETS};

/// Continuous mode prints progress after this many requests.
pub const PROGRESS_EVERY: u64 = 50;

/// Requests issued by an error-scenario session.
pub const ERROR_SCENARIO_COUNT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Every target once, in declared order.
    SinglePass,
    /// Random targets until `duration` has elapsed.
    Continuous { duration: Duration },
    /// `workers` concurrent tasks, each sending `requests / workers`.
    Burst { requests: usize, workers: usize },
    /// Random error-capable targets, `count` in total.
    ErrorScenarios { count: usize },
}

impl Mode {
    pub fn continuous_minutes(minutes: u64) -> Self {
        Mode::Continuous {
            duration: Duration::from_secs(minutes.saturating_mul(60)),
        }
    }
}

/// Inclusive-exclusive pause range between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseRange {
    pub min: Duration,
    pub max: Duration,
}

impl PauseRange {
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub const fn fixed(d: Duration) -> Self {
        Self { min: d, max: d }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        }
    }
}

/// Pauses between requests, per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub single_pass: PauseRange,
    pub continuous: PauseRange,
    pub burst: PauseRange,
    pub errors: PauseRange,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            single_pass: PauseRange::fixed(Duration::from_millis(500)),
            continuous: PauseRange::new(Duration::from_millis(100), Duration::from_secs(2)),
            burst: PauseRange::new(Duration::from_millis(50), Duration::from_millis(500)),
            errors: PauseRange::new(Duration::from_millis(200), Duration::from_secs(1)),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    pub fn none() -> Self {
        let zero = PauseRange::fixed(Duration::ZERO);
        Self {
            single_pass: zero,
            continuous: zero,
            burst: zero,
            errors: zero,
        }
    }
}

/// Counts for one finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub sent: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl SessionSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.sent += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    fn merge(&mut self, other: SessionSummary) {
        self.sent += other.sent;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// Drives sessions against one transport, reporting every event.
pub struct Session {
    transport: Arc<dyn Transport>,
    reporter: Arc<dyn Reporter>,
    pacing: Pacing,
    rng: StdRng,
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            transport,
            reporter,
            pacing: Pacing::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Run one session to completion.
    pub async fn run(&mut self, mode: &Mode) -> Result<SessionSummary> {
        if let Mode::Burst { workers: 0, .. } = mode {
            return Err(VitalsError::InvalidArgument(
                "burst needs at least one worker".into(),
            ));
        }

        tracing::info!(?mode, "session starting");
        self.reporter.report(&Event::Started(mode.clone()));

        let summary = match mode {
            Mode::SinglePass => self.single_pass().await,
            Mode::Continuous { duration } => self.continuous(*duration).await,
            Mode::Burst { requests, workers } => self.burst(*requests, *workers).await,
            Mode::ErrorScenarios { count } => self.error_scenarios(*count).await,
        };

        tracing::info!(
            sent = summary.sent,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "session finished"
        );
        self.reporter.report(&Event::Finished(mode.clone(), summary));
        Ok(summary)
    }

    async fn single_pass(&mut self) -> SessionSummary {
        let mut summary = SessionSummary::default();
        for target in &TARGETS {
            issue(&*self.transport, &*self.reporter, target, &mut summary).await;
            sleep(self.pacing.single_pass.sample(&mut self.rng)).await;
        }
        summary
    }

    async fn continuous(&mut self, duration: Duration) -> SessionSummary {
        let deadline = Instant::now() + duration;
        let mut summary = SessionSummary::default();

        while Instant::now() < deadline {
            let Some(target) = TARGETS.choose(&mut self.rng) else {
                break;
            };
            issue(&*self.transport, &*self.reporter, target, &mut summary).await;
            sleep(self.pacing.continuous.sample(&mut self.rng)).await;

            if summary.sent % PROGRESS_EVERY == 0 {
                let remaining = deadline.saturating_duration_since(Instant::now());
                self.reporter.report(&Event::Progress {
                    sent: summary.sent,
                    remaining_minutes: remaining.as_secs() / 60,
                });
            }
        }
        summary
    }

    async fn burst(&mut self, requests: usize, workers: usize) -> SessionSummary {
        let per_worker = requests / workers;
        let pause = self.pacing.burst;
        let mut set = JoinSet::new();

        for _ in 0..workers {
            let transport = Arc::clone(&self.transport);
            let reporter = Arc::clone(&self.reporter);
            let mut rng = StdRng::seed_from_u64(self.rng.gen());

            set.spawn(async move {
                let mut summary = SessionSummary::default();
                for _ in 0..per_worker {
                    let Some(target) = TARGETS.choose(&mut rng) else {
                        break;
                    };
                    issue(&*transport, &*reporter, target, &mut summary).await;
                    sleep(pause.sample(&mut rng)).await;
                }
                summary
            });
        }

        let mut total = SessionSummary::default();
        while let Some(res) = set.join_next().await {
            match res {
                Ok(summary) => total.merge(summary),
                Err(e) => tracing::warn!(error = %e, "burst worker failed"),
            }
        }
        total
    }

    async fn error_scenarios(&mut self, count: usize) -> SessionSummary {
        let mut summary = SessionSummary::default();
        for _ in 0..count {
            let Some(target) = ERROR_TARGETS.choose(&mut self.rng) else {
                break;
            };
            issue(&*self.transport, &*self.reporter, target, &mut summary).await;
            sleep(self.pacing.errors.sample(&mut self.rng)).await;
        }
        summary
    }
}

async fn issue(
    transport: &dyn Transport,
    reporter: &dyn Reporter,
    target: &Target,
    summary: &mut SessionSummary,
) {
    let outcome = transport.send(target).await;
    summary.record(&outcome);
    reporter.report(&Event::Outcome(outcome));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_range_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let range = PauseRange::new(Duration::from_millis(50), Duration::from_millis(500));
        for _ in 0..1_000 {
            let d = range.sample(&mut rng);
            assert!(d >= range.min && d < range.max);
        }
        let fixed = PauseRange::fixed(Duration::from_millis(500));
        assert_eq!(fixed.sample(&mut rng), Duration::from_millis(500));
    }

    #[test]
    fn summary_counts_by_outcome() {
        let t = Target::get("/");
        let mut s = SessionSummary::default();
        s.record(&Outcome::response(&t, 200, Duration::ZERO));
        s.record(&Outcome::response(&t, 413, Duration::ZERO));
        s.record(&Outcome::transport_error(&t, "refused", Duration::ZERO));
        assert_eq!(
            s,
            SessionSummary {
                sent: 3,
                succeeded: 1,
                failed: 2
            }
        );
    }

    #[test]
    fn continuous_minutes_converts() {
        assert_eq!(
            Mode::continuous_minutes(5),
            Mode::Continuous {
                duration: Duration::from_secs(300)
            }
        );
    }
}
