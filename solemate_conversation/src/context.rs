//! Bounded context windows over session history.
//!
//! The assembler is pure: it receives turns and catalog facts that were
//! already fetched and decides what fits.

use std::collections::HashSet;

use solemate_core::{CatalogFact, Turn};

/// Limits applied when building a [`ContextWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    /// Maximum number of prior turns to keep
    pub max_turns: usize,
    /// Maximum characters across the kept turns
    pub max_chars: usize,
    /// Maximum catalog facts to ground a reply on
    pub max_facts: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_turns: 6,
            max_chars: 8000,
            max_facts: 5,
        }
    }
}

impl ContextConfig {
    #[must_use]
    pub const fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    #[must_use]
    pub const fn with_max_chars(mut self, max: usize) -> Self {
        self.max_chars = max;
        self
    }

    #[must_use]
    pub const fn with_max_facts(mut self, max: usize) -> Self {
        self.max_facts = max;
        self
    }
}

/// Prior turns plus the catalog facts used to ground one reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextWindow {
    pub turns: Vec<Turn>,
    pub facts: Vec<CatalogFact>,
}

impl ContextWindow {
    /// Characters across the included turns.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.turns.iter().map(Turn::char_len).sum()
    }

    /// Whether `id` belongs to one of the grounding facts, ignoring ASCII case.
    #[must_use]
    pub fn has_fact(&self, id: &str) -> bool {
        self.facts.iter().any(|f| f.id.eq_ignore_ascii_case(id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    config: ContextConfig,
}

impl ContextAssembler {
    #[must_use]
    pub const fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Build the window from `history` (oldest first) and candidate facts.
    #[must_use]
    pub fn assemble(&self, history: &[Turn], facts: Vec<CatalogFact>) -> ContextWindow {
        ContextWindow {
            turns: self.select_turns(history),
            facts: self.select_facts(facts),
        }
    }

    /// The most recent turns that fit both limits.
    ///
    /// Turns are dropped oldest first and never cut, so a single turn longer
    /// than `max_chars` leaves the window empty.
    #[must_use]
    pub fn select_turns(&self, history: &[Turn]) -> Vec<Turn> {
        let start = history.len().saturating_sub(self.config.max_turns);
        let recent = &history[start..];

        let mut total_chars = 0_usize;
        let mut kept = 0_usize;
        for turn in recent.iter().rev() {
            let len = turn.char_len();
            if total_chars + len > self.config.max_chars {
                break;
            }
            total_chars += len;
            kept += 1;
        }

        recent[recent.len() - kept..].to_vec()
    }

    /// Deduplicate by id, keeping first occurrence, then cap at `max_facts`.
    #[must_use]
    pub fn select_facts(&self, facts: Vec<CatalogFact>) -> Vec<CatalogFact> {
        let mut seen = HashSet::new();
        facts
            .into_iter()
            .filter(|f| seen.insert(f.id.clone()))
            .take(self.config.max_facts)
            .collect()
    }
}

/// Counts over a session's stored turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_turns: usize,
    pub user_turns: usize,
    pub assistant_turns: usize,
    pub total_characters: usize,
}

impl HistoryStats {
    #[must_use]
    pub fn from_turns(history: &[Turn]) -> Self {
        let user_turns = history.iter().filter(|t| t.is_from_user()).count();
        Self {
            total_turns: history.len(),
            user_turns,
            assistant_turns: history.len() - user_turns,
            total_characters: history.iter().map(Turn::char_len).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use solemate_core::{Role, SessionId};

    fn create_test_turns(count: usize, text_len: usize) -> Vec<Turn> {
        (0..count)
            .map(|i| Turn {
                session_id: SessionId::new("s"),
                seq: i as u64 + 1,
                role: if i % 2 == 0 {
                    Role::User
                } else {
                    Role::Assistant
                },
                text: "x".repeat(text_len),
                created_at: Utc::now(),
            })
            .collect()
    }

    fn fact(id: &str) -> CatalogFact {
        CatalogFact {
            id: id.to_string(),
            name: format!("Shoe {id}"),
            brand: "Nike".to_string(),
            category: "Running".to_string(),
            price: 100.0,
            in_stock: true,
            size: None,
            color: None,
        }
    }

    #[test]
    fn test_turn_limit_keeps_most_recent() {
        let assembler = ContextAssembler::new(ContextConfig::default().with_max_turns(4));
        let window = assembler.assemble(&create_test_turns(10, 10), Vec::new());

        let seqs: Vec<u64> = window.turns.iter().map(|t| t.seq).collect();
        assert_eq!(seqs, [7, 8, 9, 10]);
    }

    #[test]
    fn test_char_budget_drops_oldest_whole_turns() {
        let config = ContextConfig::default()
            .with_max_turns(100)
            .with_max_chars(250);
        let assembler = ContextAssembler::new(config);
        let window = assembler.assemble(&create_test_turns(10, 100), Vec::new());

        assert!(window.text_len() <= 250);
        let seqs: Vec<u64> = window.turns.iter().map(|t| t.seq).collect();
        assert_eq!(seqs, [9, 10]);
        assert!(window.turns.iter().all(|t| t.char_len() == 100));
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        let mut turns = create_test_turns(2, 0);
        turns[0].text = "ñ".repeat(10);
        turns[1].text = "ü".repeat(10);
        let assembler = ContextAssembler::new(ContextConfig::default().with_max_chars(20));

        assert_eq!(assembler.select_turns(&turns).len(), 2);
    }

    #[test]
    fn test_oversized_latest_turn_empties_window() {
        let assembler = ContextAssembler::new(ContextConfig::default().with_max_chars(50));
        let window = assembler.assemble(&create_test_turns(3, 60), Vec::new());
        assert!(window.turns.is_empty());
    }

    #[test]
    fn test_facts_deduplicated_and_capped() {
        let assembler = ContextAssembler::new(ContextConfig::default().with_max_facts(2));
        let window = assembler.assemble(&[], vec![fact("1"), fact("1"), fact("2"), fact("3")]);

        let ids: Vec<&str> = window.facts.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert!(window.has_fact("2"));
        assert!(!window.has_fact("3"));
    }

    #[test]
    fn test_history_stats() {
        let stats = HistoryStats::from_turns(&create_test_turns(10, 5));

        assert_eq!(stats.total_turns, 10);
        assert_eq!(stats.user_turns, 5);
        assert_eq!(stats.assistant_turns, 5);
        assert_eq!(stats.total_characters, 50);
    }
}
