//! Operator-facing session reporting.

use std::io::Write;

use crate::client::Outcome;
use crate::session::{Mode, SessionSummary};

/// Something the operator should see.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started(Mode),
    Outcome(Outcome),
    Progress { sent: u64, remaining_minutes: u64 },
    Finished(Mode, SessionSummary),
}

pub trait Reporter: Send + Sync {
    fn report(&self, event: &Event);
}

/// Writes one line per event to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, event: &Event) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", render(event));
    }
}

/// The console line for `event`.
pub fn render(event: &Event) -> String {
    match event {
        Event::Started(mode) => match mode {
            Mode::SinglePass => "🧪 Testing all endpoints...".to_string(),
            Mode::Continuous { duration } => format!(
                "🚀 Starting continuous traffic generation for {} minutes...",
                duration.as_secs() / 60
            ),
            Mode::Burst { requests, workers } => format!(
                "💥 Generating burst traffic: {requests} requests with {workers} workers..."
            ),
            Mode::ErrorScenarios { .. } => "🔥 Generating error scenarios...".to_string(),
        },
        Event::Outcome(o) => match &o.error {
            Some(err) => format!(
                "❌ {} {} -> {} ({:.3}s) Error: {}",
                o.method,
                o.path,
                o.status,
                o.elapsed.as_secs_f64(),
                err
            ),
            None => format!(
                "{} {} {} -> {} ({:.3}s)",
                if o.is_success() { "✅" } else { "❌" },
                o.method,
                o.path,
                o.status,
                o.elapsed.as_secs_f64()
            ),
        },
        Event::Progress {
            sent,
            remaining_minutes,
        } => format!("📈 {sent} requests sent. {remaining_minutes} minutes remaining..."),
        Event::Finished(mode, summary) => match mode {
            Mode::SinglePass => "✅ All endpoints tested!".to_string(),
            Mode::Continuous { .. } => format!(
                "✅ Traffic generation completed! Total requests: {}",
                summary.sent
            ),
            Mode::Burst { .. } => "✅ Burst traffic generation completed!".to_string(),
            Mode::ErrorScenarios { .. } => "✅ Error scenario testing completed!".to_string(),
        },
    }
}
