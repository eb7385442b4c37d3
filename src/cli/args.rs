//! CLI argument parsing.
//!
//! Hand-rolled over an iterator so every parse path is unit-testable without
//! touching `std::env`.

use std::path::PathBuf;

/// Exchanges replayed when `--cycles` is not given.
pub const DEFAULT_CYCLES: u64 = 1;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replay the conversation headlessly and print each exchange
    Play {
        /// Landing config; the embedded one when absent.
        config_path: Option<PathBuf>,
        /// Number of exchanges to replay.
        cycles: u64,
    },
    /// Print one JSON snapshot per engine step
    Timeline {
        /// Landing config; the embedded one when absent.
        config_path: Option<PathBuf>,
        /// Number of exchanges to replay.
        cycles: u64,
    },
    /// Validate a landing config file
    Validate {
        /// Path to the config file.
        config_path: PathBuf,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// The first item is the program name.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "play" => {
                let (config_path, cycles) = Self::parse_replay_options(&args[2..]);
                Command::Play {
                    config_path,
                    cycles,
                }
            }
            "timeline" => {
                let (config_path, cycles) = Self::parse_replay_options(&args[2..]);
                Command::Timeline {
                    config_path,
                    cycles,
                }
            }
            "validate" => Self::parse_validate_command(args),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Shared options of `play` and `timeline`: `[config] [--cycles N]`.
    fn parse_replay_options(rest: &[String]) -> (Option<PathBuf>, u64) {
        let mut config_path = None;
        let mut cycles = DEFAULT_CYCLES;

        let mut i = 0;
        while i < rest.len() {
            match rest[i].as_str() {
                "-n" | "--cycles" => {
                    if let Some(value) = rest.get(i + 1) {
                        match value.parse() {
                            Ok(n) => cycles = n,
                            Err(_) => eprintln!("Ignoring invalid cycle count: {value}"),
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                flag if flag.starts_with('-') => {
                    eprintln!("Ignoring unknown option: {flag}");
                    i += 1;
                }
                path => {
                    if config_path.is_none() {
                        config_path = Some(PathBuf::from(path));
                    }
                    i += 1;
                }
            }
        }

        (config_path, cycles)
    }

    fn parse_validate_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'validate' command requires a config path");
            return Command::Help;
        }

        Command::Validate {
            config_path: PathBuf::from(&args[2]),
        }
    }
}
