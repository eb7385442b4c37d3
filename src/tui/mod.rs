//! TUI module for chatreel.
//!
//! Application state and key handling for the terminal demo, kept out of
//! the binary so it can be tested. The binary only owns terminal I/O.

#[cfg(feature = "tui")]
pub mod terminal_app;

#[cfg(test)]
#[cfg(feature = "tui")]
mod tests;
