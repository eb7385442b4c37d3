//! CLI command handlers.
//!
//! The replay helpers return data; the `run_*` handlers print it and map
//! failures to exit codes.

use std::path::Path;
use std::process::ExitCode;

use tracing::debug;

use crate::config::LandingConfig;
use crate::engine::PlayTime;
use crate::error::ChatreelResult;
use crate::playback::transcript::{SharedTranscript, Transcript};
use crate::playback::{Phase, PlaybackEngine, PlaybackSnapshot, StartOutcome};

use super::output::{print_exchange, print_help, print_validation_summary, print_version};
use super::{Args, Command};

/// One finished exchange from a headless replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Scenario index.
    pub scenario: usize,
    /// Virtual time the answer timestamp appeared.
    pub completed_at: PlayTime,
    /// Transcript text at that moment.
    pub text: String,
}

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Play {
            config_path,
            cycles,
        } => run_play(config_path.as_deref(), cycles),
        Command::Timeline {
            config_path,
            cycles,
        } => run_timeline(config_path.as_deref(), cycles),
        Command::Validate { config_path } => run_validate(&config_path),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Load the config at `path`, or the embedded one.
///
/// # Errors
///
/// Returns error if the file cannot be read or fails validation.
pub fn load_config(path: Option<&Path>) -> ChatreelResult<LandingConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading landing config");
            LandingConfig::load(path)
        }
        None => Ok(LandingConfig::embedded()),
    }
}

fn started_engine(config: &LandingConfig) -> (PlaybackEngine<SharedTranscript>, SharedTranscript) {
    let shared = SharedTranscript::new(Transcript::new());
    let mut engine = PlaybackEngine::from_config(config, Some(shared.clone()));
    let outcome = engine.start(PlayTime::ZERO);
    if outcome != StartOutcome::Started {
        debug!(?outcome, "headless replay did not start");
    }
    (engine, shared)
}

/// Replay `cycles` exchanges on virtual time.
#[must_use]
pub fn replay_exchanges(config: &LandingConfig, cycles: u64) -> Vec<Exchange> {
    let (mut engine, shared) = started_engine(config);
    let mut exchanges = Vec::new();

    while (exchanges.len() as u64) < cycles {
        let Some(step) = engine.step() else { break };
        if step.phase == Phase::Holding {
            exchanges.push(Exchange {
                scenario: step.cursor,
                completed_at: step.time,
                text: shared.borrow().render_text(),
            });
        }
    }
    exchanges
}

/// Snapshot after every engine step until `cycles` exchanges complete.
#[must_use]
pub fn replay_timeline(config: &LandingConfig, cycles: u64) -> Vec<PlaybackSnapshot> {
    let (mut engine, _shared) = started_engine(config);
    let mut snapshots = Vec::new();
    let mut completed = 0;

    while completed < cycles {
        let Some(step) = engine.step() else { break };
        snapshots.push(engine.snapshot());
        if step.phase == Phase::Holding {
            completed += 1;
        }
    }
    snapshots
}

/// Print a headless replay.
#[must_use]
pub fn run_play(path: Option<&Path>, cycles: u64) -> ExitCode {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              chatreel - Headless Conversation Replay          ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Error: {e}");
            return ExitCode::from(1);
        }
    };

    let exchanges = replay_exchanges(&config, cycles);
    for (i, exchange) in exchanges.iter().enumerate() {
        print_exchange(i + 1, exchange);
    }
    println!("✓ Replayed {} exchange(s)", exchanges.len());
    ExitCode::SUCCESS
}

/// Print the JSON timeline, one snapshot per line.
#[must_use]
pub fn run_timeline(path: Option<&Path>, cycles: u64) -> ExitCode {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Error: {e}");
            return ExitCode::from(1);
        }
    };

    for snapshot in replay_timeline(&config, cycles) {
        match serde_json::to_string(&snapshot) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                eprintln!("✗ Error: {e}");
                return ExitCode::from(1);
            }
        }
    }
    ExitCode::SUCCESS
}

/// Validate a config file and print a summary.
#[must_use]
pub fn run_validate(path: &Path) -> ExitCode {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              chatreel - Landing Config Validation             ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    println!("Validating: {}\n", path.display());

    match LandingConfig::load(path) {
        Ok(config) => {
            print_validation_summary(&config);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::from(1)
        }
    }
}
