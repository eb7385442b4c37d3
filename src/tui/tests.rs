//! Tests for the terminal demo app.

use super::terminal_app::{TerminalApp, MAX_SPEED};
use crate::config::LandingConfig;
use crate::engine::PlayTime;
use crate::playback::Phase;
use crossterm::event::KeyCode;
use std::time::Duration;

fn frame() -> Duration {
    Duration::from_millis(33)
}

fn small_app() -> TerminalApp {
    TerminalApp::from_config(
        LandingConfig::builder()
            .scenario("status?", "ok\ndone")
            .scenario("next?", "yes")
            .build(),
    )
}

#[test]
fn test_terminal_app_lifecycle() {
    let mut app = small_app();

    // Initial state
    assert!(!app.paused);
    assert!(!app.should_quit());
    assert_eq!(app.frame_count, 0);
    assert_eq!(app.engine.phase(), Phase::AwaitingKickoff);

    // Run a few frames
    for _ in 0..5 {
        app.update(frame());
    }
    assert_eq!(app.frame_count, 5);
    assert_eq!(app.play_time, PlayTime::from_millis(165));

    // Pause
    app.handle_key(KeyCode::Char(' '));
    assert!(app.paused);
    let before = app.play_time;
    app.update(frame());
    assert_eq!(app.play_time, before);
    app.handle_key(KeyCode::Char(' '));

    // Reset
    app.update(Duration::from_secs(4));
    app.handle_key(KeyCode::Char('r'));
    assert_eq!(app.frame_count, 0);
    assert_eq!(app.play_time, PlayTime::ZERO);
    assert!(app.transcript.borrow().messages().is_empty());

    // Quit
    app.handle_key(KeyCode::Char('q'));
    assert!(app.should_quit());
}

#[test]
fn test_escape_quits() {
    let mut app = small_app();
    app.handle_key(KeyCode::Esc);
    assert!(app.should_quit());
}

#[test]
fn test_update_drives_transcript() {
    let mut app = small_app();
    app.update(Duration::from_millis(1_000));
    assert_eq!(app.transcript.borrow().messages().len(), 2);
    assert_eq!(app.engine.phase(), Phase::Thinking);

    app.update(Duration::from_millis(2_200));
    let text = app.transcript.borrow().render_text();
    assert!(text.contains("  ok\n  done\n  [14:33]\n"));
}

#[test]
fn test_speed_controls() {
    let mut app = small_app();
    app.handle_key(KeyCode::Char('+'));
    assert_eq!(app.speed, 2);
    for _ in 0..10 {
        app.handle_key(KeyCode::Char('+'));
    }
    assert_eq!(app.speed, MAX_SPEED);

    app.update(Duration::from_millis(10));
    assert_eq!(app.play_time, PlayTime::from_millis(80));

    for _ in 0..10 {
        app.handle_key(KeyCode::Char('-'));
    }
    assert_eq!(app.speed, 1);
}

#[test]
fn test_typing_dots_cycle() {
    let mut app = small_app();
    let first = app.typing_dots();
    for _ in 0..8 {
        app.update(frame());
    }
    assert_ne!(app.typing_dots(), first);
}

#[test]
fn test_status_line() {
    let app = small_app();
    let status = app.status_line();
    assert!(status.starts_with("Scenario 1/2"));
    assert!(status.contains("Speed: 1x"));
}

#[test]
fn test_default_uses_embedded_script() {
    let app = TerminalApp::default();
    assert_eq!(app.engine.deck().len(), 6);
}

#[test]
fn test_from_yaml_rejects_invalid() {
    assert!(TerminalApp::from_yaml("terminal:\n  scenarios: []\n").is_err());
}
