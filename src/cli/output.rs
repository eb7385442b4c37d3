//! CLI output formatting.

use crate::config::LandingConfig;
use crate::lead::WebhookTarget;

use super::commands::Exchange;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print version information.
pub fn print_version() {
    let version = option_env!("CHATREEL_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("chatreel {version}");
    if let Some(hash) = option_env!("GIT_HASH").filter(|h| !h.is_empty()) {
        println!("commit {hash}");
    }
}

/// Print help message.
pub fn print_help() {
    println!(
        r"chatreel - Scripted chat terminal for landing pages

USAGE:
    chatreel <COMMAND> [OPTIONS]

COMMANDS:
    play [config.yaml]          Replay the conversation and print each exchange
        -n, --cycles <N>        Number of exchanges (default: 1)

    timeline [config.yaml]      Print one JSON snapshot per engine step
        -n, --cycles <N>        Number of exchanges (default: 1)

    validate <config.yaml>      Validate a landing config file

    help                        Show this help message
    version                     Show version information

Without a config file the embedded demos/landing.yaml is used.

EXAMPLES:
    chatreel play --cycles 6
    chatreel timeline demos/landing.yaml -n 2 > timeline.jsonl
    chatreel validate demos/landing.yaml

Set RUST_LOG=chatreel=debug to trace engine steps on stderr.
"
    );
}

/// Print one replayed exchange.
pub fn print_exchange(number: usize, exchange: &Exchange) {
    println!("{RULE}");
    println!(
        "Exchange {number} (scenario {}) complete at {}",
        exchange.scenario, exchange.completed_at
    );
    println!("{RULE}");
    println!("{}", exchange.text);
}

/// Format a duration in milliseconds as seconds.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_seconds(millis: u64) -> String {
    format!("{:.3}s", millis as f64 / 1000.0)
}

/// Print a summary of a valid config.
pub fn print_validation_summary(config: &LandingConfig) {
    let terminal = &config.terminal;
    let timing = &terminal.timing;

    println!("{RULE}");
    println!("Schema version: {}", config.schema_version);
    println!("{RULE}\n");

    println!("Timing:");
    println!("  Kick-off:       {} ms", timing.kickoff_ms);
    println!("  Typing dwell:   {} ms", timing.dwell_ms);
    println!("  Char interval:  {} ms", timing.char_interval_ms);
    println!("  Hold:           {} ms", timing.hold_ms);

    println!("\nScenarios:");
    let mut total: u64 = 0;
    for (i, scenario) in terminal.scenarios.iter().enumerate() {
        let cycle = timing.cycle_ms(scenario.reveal_len());
        total = total.saturating_add(cycle);
        println!(
            "  {i}. {} ({} chars, {})",
            scenario.question,
            scenario.reveal_len(),
            format_seconds(cycle)
        );
    }
    println!("  Full loop: {}", format_seconds(total));

    println!("\nLead capture:");
    match WebhookTarget::from_config(&config.lead) {
        WebhookTarget::Url(url) => println!("  ✓ Webhook: {url}"),
        WebhookTarget::Disabled => println!("  ! Webhook not configured, submissions are not sent"),
    }

    println!("\n{RULE}");
    println!("✓ Result: VALID");
    println!("{RULE}\n");
}
