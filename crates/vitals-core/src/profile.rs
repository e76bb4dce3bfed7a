//! Endpoint profiles: the fixed workload shape of every simulated endpoint.
//!
//! Sampling an [`Endpoint`] yields a [`Plan`]: how long the handler should
//! suspend, whether the call fails (and with which [`ErrorKind`]), and the
//! random payload values the success body is built from. All randomness is
//! drawn here, from the caller's `Rng`, in one place.
//!
//! Failure rules are plain predicates over the sampled value so they can be
//! checked without any randomness at all.

use std::fmt;
use std::time::Duration;

use rand::Rng;

/// Query used by `search` when the caller sends no `q` parameter.
pub const DEFAULT_QUERY: &str = "default";

/// Failure probability of `user_profile`.
pub const USER_PROFILE_FAILURE_RATE: f64 = 0.10;

/// `heavy_computation` times out when its sampled duration exceeds this.
pub const COMPUTATION_TIMEOUT_SECS: f64 = 1.5;

/// `file_upload` rejects files strictly larger than this (MB).
pub const MAX_UPLOAD_MB: u32 = 80;

/// Seconds of extra search latency per query character.
const SEARCH_SECS_PER_CHAR: f64 = 0.02;

/// Seconds of extra upload latency per MB.
const UPLOAD_SECS_PER_MB: f64 = 0.01;

/// Label classifying why a simulated request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DatabaseError,
    InvalidQuery,
    Timeout,
    FileTooLarge,
}

impl ErrorKind {
    /// Label value used in `api_errors_total{error_type=...}`.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DatabaseError => "database_error",
            ErrorKind::InvalidQuery => "invalid_query",
            ErrorKind::Timeout => "timeout",
            ErrorKind::FileTooLarge => "file_too_large",
        }
    }

    /// HTTP status returned for this failure.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::DatabaseError => 500,
            ErrorKind::InvalidQuery => 400,
            ErrorKind::Timeout => 408,
            ErrorKind::FileTooLarge => 413,
        }
    }

    /// Client-facing message placed in the `error` field.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::DatabaseError => "Database connection failed",
            ErrorKind::InvalidQuery => "Invalid search query",
            ErrorKind::Timeout => "Computation timed out",
            ErrorKind::FileTooLarge => "File too large",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of simulated endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Home,
    UserProfile,
    Search,
    HeavyComputation,
    FileUpload,
    Analytics,
    Health,
    LoadTest,
}

impl Endpoint {
    /// Every endpoint, in declaration order.
    pub const ALL: [Endpoint; 8] = [
        Endpoint::Home,
        Endpoint::UserProfile,
        Endpoint::Search,
        Endpoint::HeavyComputation,
        Endpoint::FileUpload,
        Endpoint::Analytics,
        Endpoint::Health,
        Endpoint::LoadTest,
    ];

    /// Endpoint name, used as the `view_name` metric label.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Home => "home",
            Endpoint::UserProfile => "user_profile",
            Endpoint::Search => "search",
            Endpoint::HeavyComputation => "heavy_computation",
            Endpoint::FileUpload => "file_upload",
            Endpoint::Analytics => "analytics",
            Endpoint::Health => "health",
            Endpoint::LoadTest => "load_test",
        }
    }

    /// Path relative to the application prefix (`/app`).
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Home => "/",
            Endpoint::UserProfile => "/user/profile/",
            Endpoint::Search => "/search/",
            Endpoint::HeavyComputation => "/compute/",
            Endpoint::FileUpload => "/upload/",
            Endpoint::Analytics => "/analytics/",
            Endpoint::Health => "/health/",
            Endpoint::LoadTest => "/loadtest/",
        }
    }

    /// Whether any input can make this endpoint fail.
    pub fn can_fail(self) -> bool {
        matches!(
            self,
            Endpoint::UserProfile
                | Endpoint::Search
                | Endpoint::HeavyComputation
                | Endpoint::FileUpload
        )
    }

    /// Sample one realisation of this endpoint's profile.
    ///
    /// `query` is only read by `search`; `None` means [`DEFAULT_QUERY`].
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R, query: Option<&str>) -> Plan {
        match self {
            Endpoint::Home => Plan::ok(
                self,
                uniform_secs(rng, 0.05, 0.2),
                Detail::Home {
                    active_users: rng.gen_range(10..=50),
                    gauge_users: rng.gen_range(10..=50),
                },
            ),
            Endpoint::UserProfile => {
                let delay = uniform_secs(rng, 0.1, 0.4);
                let draw: f64 = rng.gen();
                let detail = Detail::UserProfile {
                    user_id: rng.gen_range(1..=1000),
                    username_no: rng.gen_range(1..=100),
                };
                Plan::new(
                    self,
                    delay,
                    user_profile_fails(draw).then_some(ErrorKind::DatabaseError),
                    detail,
                )
            }
            Endpoint::Search => {
                let query = query.unwrap_or(DEFAULT_QUERY).to_string();
                let jitter: f64 = rng.gen_range(0.05..0.3);
                let secs = query.chars().count() as f64 * SEARCH_SECS_PER_CHAR + jitter;
                let failure = query_is_invalid(&query).then_some(ErrorKind::InvalidQuery);
                let hits: usize = rng.gen_range(0..=10);
                let scores: Vec<f64> = (0..hits).map(|_| rng.gen_range(0.1..=1.0)).collect();
                Plan::new(self, secs_to_duration(secs), failure, Detail::Search { query, scores })
            }
            Endpoint::HeavyComputation => {
                // One draw drives both the delay and the timeout decision.
                let secs: f64 = rng.gen_range(0.5..2.0);
                let failure = computation_times_out(secs).then_some(ErrorKind::Timeout);
                Plan::new(
                    self,
                    secs_to_duration(secs),
                    failure,
                    Detail::HeavyComputation {
                        result: rng.gen_range(1000..=9999),
                    },
                )
            }
            Endpoint::FileUpload => {
                let size_mb: u32 = rng.gen_range(1..=100);
                let jitter: f64 = rng.gen_range(0.1..0.5);
                let secs = f64::from(size_mb) * UPLOAD_SECS_PER_MB + jitter;
                let failure = upload_too_large(size_mb).then_some(ErrorKind::FileTooLarge);
                Plan::new(
                    self,
                    secs_to_duration(secs),
                    failure,
                    Detail::FileUpload {
                        size_mb,
                        file_no: rng.gen_range(1..=1000),
                    },
                )
            }
            Endpoint::Analytics => Plan::ok(
                self,
                uniform_secs(rng, 0.2, 0.8),
                Detail::Analytics {
                    daily_users: rng.gen_range(100..=500),
                    page_views: rng.gen_range(1000..=5000),
                    bounce_rate: rng.gen_range(0.2..0.8),
                    avg_session_duration: rng.gen_range(120.0..600.0),
                },
            ),
            Endpoint::Health => Plan::ok(self, Duration::ZERO, Detail::Health),
            Endpoint::LoadTest => Plan::ok(
                self,
                uniform_secs(rng, 0.1, 1.0),
                Detail::LoadTest {
                    request_id: rng.gen_range(10000..=99999),
                },
            ),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload values drawn while sampling, one variant per endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Home {
        active_users: u32,
        /// Value published to the `active_users_count` gauge.
        gauge_users: u32,
    },
    UserProfile {
        user_id: u32,
        username_no: u32,
    },
    Search {
        query: String,
        scores: Vec<f64>,
    },
    HeavyComputation {
        result: u32,
    },
    FileUpload {
        size_mb: u32,
        file_no: u32,
    },
    Analytics {
        daily_users: u32,
        page_views: u32,
        bounce_rate: f64,
        avg_session_duration: f64,
    },
    Health,
    LoadTest {
        request_id: u32,
    },
}

/// One sampled realisation of an endpoint profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub endpoint: Endpoint,
    /// How long the handler suspends before answering.
    pub delay: Duration,
    /// `Some` when this call answers with a simulated failure.
    pub failure: Option<ErrorKind>,
    pub detail: Detail,
}

impl Plan {
    fn new(endpoint: Endpoint, delay: Duration, failure: Option<ErrorKind>, detail: Detail) -> Self {
        Self {
            endpoint,
            delay,
            failure,
            detail,
        }
    }

    fn ok(endpoint: Endpoint, delay: Duration, detail: Detail) -> Self {
        Self::new(endpoint, delay, None, detail)
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// `user_profile` fails when a uniform `[0, 1)` draw lands below the rate.
pub fn user_profile_fails(draw: f64) -> bool {
    draw < USER_PROFILE_FAILURE_RATE
}

/// `search` rejects any query containing "error", case-insensitively.
pub fn query_is_invalid(query: &str) -> bool {
    query.to_lowercase().contains("error")
}

pub fn computation_times_out(secs: f64) -> bool {
    secs > COMPUTATION_TIMEOUT_SECS
}

pub fn upload_too_large(size_mb: u32) -> bool {
    size_mb > MAX_UPLOAD_MB
}

fn uniform_secs<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> Duration {
    secs_to_duration(rng.gen_range(lo..hi))
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
