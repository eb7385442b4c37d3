//! Canned question/answer exchanges and the deck that orders them.

use serde::{Deserialize, Serialize};

/// One canned exchange shown in the demo terminal.
///
/// Missing fields in configuration deserialize to empty strings, so a
/// malformed entry plays as a silent exchange instead of failing the deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Visitor's question, shown instantly.
    #[serde(default)]
    pub question: String,
    /// Scripted answer, revealed one character per tick.
    #[serde(default)]
    pub answer: String,
}

impl Scenario {
    /// Create a scenario.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// The answer as a sequence of reveal ticks.
    pub fn reveal_units(&self) -> impl Iterator<Item = RevealUnit> + '_ {
        self.answer.chars().map(RevealUnit::from)
    }

    /// Number of reveal ticks the answer takes.
    #[must_use]
    pub fn reveal_len(&self) -> usize {
        self.answer.chars().count()
    }
}

/// What a single reveal tick adds to the answer region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealUnit {
    /// A visible character.
    Char(char),
    /// A line break, from `'\n'` in the source text.
    LineBreak,
}

impl From<char> for RevealUnit {
    fn from(ch: char) -> Self {
        if ch == '\n' {
            Self::LineBreak
        } else {
            Self::Char(ch)
        }
    }
}

/// Ordered, read-only scenario sequence that wraps cyclically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioDeck {
    scenarios: Vec<Scenario>,
}

impl ScenarioDeck {
    /// Create a deck from scenarios in playback order.
    #[must_use]
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Number of scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the deck has nothing to play.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Scenario at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Scenario> {
        self.scenarios.get(index)
    }

    /// Index that follows `index`, wrapping to the start.
    ///
    /// An empty deck always yields 0.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        if self.scenarios.is_empty() {
            0
        } else {
            (index + 1) % self.scenarios.len()
        }
    }

    /// Iterate scenarios in playback order.
    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }
}

impl From<Vec<Scenario>> for ScenarioDeck {
    fn from(scenarios: Vec<Scenario>) -> Self {
        Self::new(scenarios)
    }
}

impl<'a> IntoIterator for &'a ScenarioDeck {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_units_translate_newlines() {
        let scenario = Scenario::new("status?", "ok\ndone");
        let units: Vec<RevealUnit> = scenario.reveal_units().collect();
        assert_eq!(
            units,
            vec![
                RevealUnit::Char('o'),
                RevealUnit::Char('k'),
                RevealUnit::LineBreak,
                RevealUnit::Char('d'),
                RevealUnit::Char('o'),
                RevealUnit::Char('n'),
                RevealUnit::Char('e'),
            ]
        );
    }

    #[test]
    fn test_reveal_len_counts_scalar_values() {
        // Emoji and accented letters are single ticks
        let scenario = Scenario::new("", "\u{1F4CA} at\u{e9}");
        assert_eq!(scenario.reveal_len(), 5);
        assert_eq!(scenario.reveal_units().count(), 5);
    }

    #[test]
    fn test_empty_answer_has_no_ticks() {
        assert_eq!(Scenario::new("q", "").reveal_len(), 0);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let scenario: Scenario = serde_yaml::from_str("question: \"only a question\"").expect("parse");
        assert_eq!(scenario.question, "only a question");
        assert!(scenario.answer.is_empty());

        let scenario: Scenario = serde_yaml::from_str("{}").expect("parse");
        assert_eq!(scenario, Scenario::default());
    }

    #[test]
    fn test_unknown_scenario_field_rejected() {
        let result: Result<Scenario, _> = serde_yaml::from_str("question: a\nreply: b");
        assert!(result.is_err());
    }

    #[test]
    fn test_deck_wraps() {
        let deck = ScenarioDeck::new(vec![
            Scenario::new("a", "1"),
            Scenario::new("b", "2"),
            Scenario::new("c", "3"),
        ]);
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.next_index(0), 1);
        assert_eq!(deck.next_index(2), 0);
        assert_eq!(deck.get(1).map(|s| s.question.as_str()), Some("b"));
        assert!(deck.get(3).is_none());
    }

    #[test]
    fn test_empty_deck() {
        let deck = ScenarioDeck::default();
        assert!(deck.is_empty());
        assert_eq!(deck.next_index(5), 0);
        assert!(deck.get(0).is_none());
    }

    #[test]
    fn test_deck_iterates_in_order() {
        let deck: ScenarioDeck = vec![Scenario::new("x", ""), Scenario::new("y", "")].into();
        let questions: Vec<&str> = deck.iter().map(|s| s.question.as_str()).collect();
        assert_eq!(questions, ["x", "y"]);
    }
}
