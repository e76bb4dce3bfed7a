//! Interactive operator menu.
//!
//! Reads one line per iteration, maps it to a [`Mode`] and runs it. The loop
//! ends on "5" or end of input.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use vitals_core::error::Result;

use crate::session::{Mode, Session, ERROR_SCENARIO_COUNT};

/// Burst preset offered by the menu.
pub const MENU_BURST_REQUESTS: usize = 100;
pub const MENU_BURST_WORKERS: usize = 5;

/// Continuous preset offered by the menu, in minutes.
pub const MENU_CONTINUOUS_MINUTES: u64 = 5;

const RULE: &str = "==================================================";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Run(Mode),
    Exit,
    Invalid,
}

pub fn parse_choice(line: &str) -> Choice {
    match line.trim() {
        "1" => Choice::Run(Mode::SinglePass),
        "2" => Choice::Run(Mode::continuous_minutes(MENU_CONTINUOUS_MINUTES)),
        "3" => Choice::Run(Mode::Burst {
            requests: MENU_BURST_REQUESTS,
            workers: MENU_BURST_WORKERS,
        }),
        "4" => Choice::Run(Mode::ErrorScenarios {
            count: ERROR_SCENARIO_COUNT,
        }),
        "5" => Choice::Exit,
        _ => Choice::Invalid,
    }
}

fn print_menu(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "\nChoose an option:")?;
    writeln!(out, "1. Test all endpoints once")?;
    writeln!(out, "2. Generate continuous traffic ({MENU_CONTINUOUS_MINUTES} minutes)")?;
    writeln!(out, "3. Generate burst traffic ({MENU_BURST_REQUESTS} requests)")?;
    writeln!(out, "4. Generate error scenarios")?;
    writeln!(out, "5. Exit")?;
    write!(out, "\nEnter your choice (1-5): ")?;
    out.flush()
}

/// Run the menu until the operator exits or input ends.
pub async fn run_menu<I>(session: &mut Session, input: I, out: &mut dyn Write) -> Result<()>
where
    I: AsyncBufRead + Unpin,
{
    writeln!(out, "🎯 vitals traffic generator")?;
    writeln!(out, "{RULE}")?;

    let mut lines = input.lines();
    loop {
        print_menu(out)?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        match parse_choice(&line) {
            Choice::Run(mode) => {
                if let Err(e) = session.run(&mode).await {
                    tracing::warn!(error = %e, "session rejected");
                    writeln!(out, "❌ {e}")?;
                }
            }
            Choice::Exit => {
                writeln!(out, "👋 Goodbye!")?;
                return Ok(());
            }
            Choice::Invalid => writeln!(out, "❌ Invalid choice. Please try again.")?,
        }

        writeln!(out, "\n{RULE}")?;
    }
    Ok(())
}
