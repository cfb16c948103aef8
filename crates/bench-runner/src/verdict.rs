//! Turning the engine's combined output into a match verdict.
//!
//! Parsing is an ordered chain of strategies. The first one that recognizes a
//! winner decides the outcome; when none does the game counts as a draw.

use bench_core::{MatchResult, Outcome};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static WINNER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"WINNER:\s*(-?\d+)").unwrap());
static FINAL_TICK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"FINAL_TICK:\s*(\d+)").unwrap());

/// One way of reading a winner out of engine output
pub trait VerdictStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Outcome from player 0's side, `None` if this strategy sees no winner
    fn outcome(&self, output: &str) -> Option<Outcome>;
}

/// `WINNER: <id>` marker printed by the instrumented engine
#[derive(Debug, Default, Clone, Copy)]
pub struct SentinelStrategy;

impl VerdictStrategy for SentinelStrategy {
    fn name(&self) -> &'static str {
        "sentinel"
    }

    fn outcome(&self, output: &str) -> Option<Outcome> {
        let caps = WINNER_RE.captures(output)?;
        let winner: i64 = caps[1].parse().ok()?;
        Some(match winner {
            0 => Outcome::Win,
            1 => Outcome::Loss,
            _ => Outcome::Draw,
        })
    }
}

/// Human readable "Player N wins" lines
#[derive(Debug, Default, Clone, Copy)]
pub struct PhraseStrategy;

impl VerdictStrategy for PhraseStrategy {
    fn name(&self) -> &'static str {
        "phrase"
    }

    fn outcome(&self, output: &str) -> Option<Outcome> {
        if output.contains("Player 0 wins") {
            Some(Outcome::Win)
        } else if output.contains("Player 1 wins") {
            Some(Outcome::Loss)
        } else {
            None
        }
    }
}

/// Ordered strategy chain
pub struct VerdictParser {
    strategies: Vec<Box<dyn VerdictStrategy>>,
}

impl Default for VerdictParser {
    fn default() -> Self {
        Self::new(vec![Box::new(SentinelStrategy), Box::new(PhraseStrategy)])
    }
}

impl VerdictParser {
    pub fn new(strategies: Vec<Box<dyn VerdictStrategy>>) -> Self {
        Self { strategies }
    }

    /// First outcome any strategy finds
    pub fn winner(&self, output: &str) -> Option<Outcome> {
        self.strategies.iter().find_map(|strategy| {
            let outcome = strategy.outcome(output)?;
            debug!(strategy = strategy.name(), %outcome, "verdict found");
            Some(outcome)
        })
    }

    /// Full verdict. Undecided output is a draw at the ceiling.
    pub fn parse(&self, output: &str, ceiling: u32) -> MatchResult {
        let ticks = final_tick(output).unwrap_or(ceiling);
        match self.winner(output) {
            Some(outcome) => MatchResult::new(outcome, ticks),
            None => {
                debug!("no winner in output, scoring as draw");
                MatchResult::draw(ticks)
            }
        }
    }
}

/// Tick count from the `FINAL_TICK:` marker
pub fn final_tick(output: &str) -> Option<u32> {
    FINAL_TICK_RE.captures(output)?[1].parse().ok()
}

#[cfg(test)]
#[path = "verdict_tests.rs"]
mod verdict_tests;
