//! Per-game scoring and letter grades

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{MatchResult, Outcome};

/// Base score of a win
pub const WIN_SCORE: f64 = 1.0;

/// Score of a draw
pub const DRAW_SCORE: f64 = 0.5;

/// Highest score a single game can earn (a fast win)
pub const MAX_GAME_SCORE: f64 = 1.2;

/// Score one game against a reference opponent.
///
/// A win earns 1.0 plus a speed bonus: +0.2 when it took less than half the
/// cycle ceiling, +0.1 under three quarters. Draws earn 0.5; losses,
/// timeouts and errors earn nothing.
pub fn game_score(outcome: Outcome, ticks: u32, ceiling: u32) -> f64 {
    match outcome {
        Outcome::Win => {
            let ticks = f64::from(ticks);
            let ceiling = f64::from(ceiling);
            let bonus = if ticks < ceiling * 0.5 {
                0.2
            } else if ticks < ceiling * 0.75 {
                0.1
            } else {
                0.0
            };
            (WIN_SCORE + bonus).min(MAX_GAME_SCORE)
        }
        Outcome::Draw => DRAW_SCORE,
        Outcome::Loss | Outcome::Timeout | Outcome::Error => 0.0,
    }
}

/// [`game_score`] for a recorded result
pub fn result_score(result: &MatchResult, ceiling: u32) -> f64 {
    game_score(result.outcome, result.ticks, ceiling)
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Letter grade for a 0-100 benchmark score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::APlus
        } else if score >= 80.0 {
            Grade::A
        } else if score >= 70.0 {
            Grade::B
        } else if score >= 60.0 {
            Grade::C
        } else if score >= 40.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod score_tests;
