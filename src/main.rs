//! chatreel CLI - scripted chat playback
//!
//! Replays the landing page conversation on the terminal, prints its
//! timeline as JSON lines, or validates a config.

use std::process::ExitCode;

use chatreel::cli::{run_cli, Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    run_cli(Args::parse())
}
