//! CLI module for chatreel.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested. The
//! entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, DEFAULT_CYCLES};
pub use commands::{load_config, replay_exchanges, replay_timeline, run_cli, Exchange};
pub use output::{format_seconds, print_help, print_version};
