use chatreel::cli::{replay_exchanges, replay_timeline};
use chatreel::prelude::*;

fn landing() -> LandingConfig {
    LandingConfig::embedded()
}

// H0: Two replays of the same config diverge
// Falsification: Replay the embedded deck twice and compare every snapshot
#[test]
fn h0_1_identical_config_produces_identical_timeline() {
    let config = landing();
    let first = replay_timeline(&config, 12);
    let second = replay_timeline(&config, 12);

    assert!(!first.is_empty());
    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b, "Replays of one config diverged");
}

// H0: Exchanges complete off the configured cadence
// Falsification: Gap between consecutive answer timestamps must equal the
// next scenario's full cycle
#[test]
fn h0_2_exchange_spacing_matches_cycle_length() {
    let config = landing();
    let timing = config.terminal.timing;
    let deck = config.terminal.deck();
    let exchanges = replay_exchanges(&config, deck.len() as u64 + 2);

    let first_len = deck.get(0).unwrap().reveal_len() as u64;
    assert_eq!(
        exchanges[0].completed_at.as_millis(),
        timing.kickoff_ms + timing.dwell_ms + first_len * timing.char_interval_ms
    );

    for pair in exchanges.windows(2) {
        let next = deck.get(pair[1].scenario).unwrap();
        let gap = pair[1].completed_at.as_millis() - pair[0].completed_at.as_millis();
        assert_eq!(
            gap,
            timing.cycle_ms(next.reveal_len()),
            "Gap before scenario {} drifted",
            pair[1].scenario
        );
    }
}

// H0: Some scenario is skipped or repeated within a lap of the deck
// Falsification: Two laps must visit every index in order, twice
#[test]
fn h0_3_every_scenario_plays_in_order() {
    let config = landing();
    let n = config.terminal.scenarios.len();
    let exchanges = replay_exchanges(&config, 2 * n as u64);

    let order: Vec<usize> = exchanges.iter().map(|e| e.scenario).collect();
    let expected: Vec<usize> = (0..n).chain(0..n).collect();
    assert_eq!(order, expected);
}

// H0: A finished exchange leaks text from the previous one
// Falsification: Each completed transcript holds exactly its own question
// and answer
#[test]
fn h0_4_exchanges_are_isolated() {
    let config = landing();
    let deck = config.terminal.deck();
    for exchange in replay_exchanges(&config, deck.len() as u64) {
        let scenario = deck.get(exchange.scenario).unwrap();
        assert!(exchange.text.contains(&scenario.question));
        for (i, other) in deck.iter().enumerate() {
            if i != exchange.scenario {
                assert!(
                    !exchange.text.contains(&other.question),
                    "Scenario {i} leaked into {}",
                    exchange.scenario
                );
            }
        }
    }
}

// H0: Host wake-up granularity changes what is rendered
// Falsification: Drive one engine per deadline and one with coarse 250ms
// frames; final transcripts must match
#[test]
fn h0_5_frame_rate_does_not_change_output() {
    let config = landing();

    let precise = SharedTranscript::new(Transcript::new());
    let mut a = PlaybackEngine::from_config(&config, Some(precise.clone()));
    assert_eq!(a.start(PlayTime::ZERO), StartOutcome::Started);
    while let Some(deadline) = a.next_deadline() {
        if deadline > PlayTime::from_millis(30_000) {
            break;
        }
        a.advance_to(deadline);
    }
    a.advance_to(PlayTime::from_millis(30_000));

    let coarse = SharedTranscript::new(Transcript::new());
    let mut b = PlaybackEngine::from_config(&config, Some(coarse.clone()));
    assert_eq!(b.start(PlayTime::ZERO), StartOutcome::Started);
    let mut now = 0;
    while now < 30_000 {
        now += 250;
        b.advance_to(PlayTime::from_millis(now));
    }

    assert_eq!(precise.borrow().render_text(), coarse.borrow().render_text());
    assert_eq!(a.snapshot(), b.snapshot());
}
