//! Command-line arguments.

use std::time::Duration;

use clap::{Parser, Subcommand};

use vitals_core::error::{Result, VitalsError};

use crate::session::{Mode, ERROR_SCENARIO_COUNT};
use crate::target::DEFAULT_BASE_URL;

#[derive(Debug, Parser)]
#[command(name = "vitals-traffic", about = "Traffic generator for the vitals demo service")]
pub struct Cli {
    /// Base URL the target paths are appended to.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Seed for target and pause selection.
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive menu (default).
    Menu,
    /// Every endpoint once.
    Single,
    /// Random traffic for a fixed duration.
    Continuous {
        #[arg(long, default_value_t = 5)]
        minutes: u64,
    },
    /// Concurrent workers sharing a request budget.
    Burst {
        #[arg(long, default_value_t = 100)]
        requests: usize,
        #[arg(long, default_value_t = 5)]
        workers: usize,
    },
    /// Requests against error-capable endpoints only.
    Errors {
        #[arg(long, default_value_t = ERROR_SCENARIO_COUNT)]
        count: usize,
    },
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(VitalsError::InvalidArgument(
                "--timeout-secs must be at least 1".into(),
            ));
        }
        if let Some(Command::Burst { workers: 0, .. }) = self.command {
            return Err(VitalsError::InvalidArgument(
                "--workers must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The one-shot mode requested, or `None` for the interactive menu.
    pub fn mode(&self) -> Option<Mode> {
        match self.command.as_ref()? {
            Command::Menu => None,
            Command::Single => Some(Mode::SinglePass),
            Command::Continuous { minutes } => Some(Mode::continuous_minutes(*minutes)),
            Command::Burst { requests, workers } => Some(Mode::Burst {
                requests: *requests,
                workers: *workers,
            }),
            Command::Errors { count } => Some(Mode::ErrorScenarios { count: *count }),
        }
    }
}
