//! vitals traffic driver.
//!
//! Generates load against the vitals service in four session modes and
//! reports each request to the operator console. Transport failures are
//! reported as status-0 outcomes and never end a session.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cli;
pub mod client;
pub mod menu;
pub mod report;
pub mod session;
pub mod target;

pub use client::{HttpTransport, Outcome, Transport};
pub use report::{ConsoleReporter, Event, Reporter};
pub use session::{Mode, Pacing, Session, SessionSummary};
