//! vitals traffic driver
//!
//! `vitals-traffic` opens the interactive menu; subcommands run one session
//! and exit. Log level comes from `RUST_LOG`.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use vitals_core::error::Result;
use vitals_traffic::cli::Cli;
use vitals_traffic::{menu, ConsoleReporter, HttpTransport, Session};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.validate()?;

    let transport = HttpTransport::new(&cli.base_url, cli.timeout())?;
    let mut session = Session::new(Arc::new(transport), Arc::new(ConsoleReporter));
    if let Some(seed) = cli.seed {
        session = session.with_seed(seed);
    }

    tracing::info!(base_url = %cli.base_url, "vitals-traffic starting");

    match cli.mode() {
        Some(mode) => {
            session.run(&mode).await?;
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            menu::run_menu(&mut session, stdin, &mut stdout).await?;
        }
    }
    Ok(())
}
