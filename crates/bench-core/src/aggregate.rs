//! Benchmark score aggregation and per-opponent breakdowns

use serde::{Deserialize, Serialize};

use crate::ladder::OpponentBatch;
use crate::score::{result_score, round_to};
use crate::types::{MatchResult, Outcome, OpponentSet};

/// Win/draw/loss tally against one opponent.
///
/// The derived fields are only known when the run stored them or the games
/// could be rescored under the run's own weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentStats {
    pub wins: u32,
    pub draws: u32,
    /// Everything that is neither a win nor a draw
    pub losses: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_game_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_points: Option<f64>,
}

impl OpponentStats {
    /// Counts only, no derived fields
    pub fn tally<'a>(results: impl IntoIterator<Item = &'a MatchResult>) -> Self {
        let mut stats = Self::default();
        for result in results {
            match result.outcome {
                Outcome::Win => stats.wins += 1,
                Outcome::Draw => stats.draws += 1,
                _ => stats.losses += 1,
            }
        }
        stats
    }

    pub fn games(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// One row of a breakdown, kept in ladder order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentLine {
    pub opponent: String,
    #[serde(flatten)]
    pub stats: OpponentStats,
}

/// Average per-game score of a batch, 0 for an empty batch
pub fn batch_average(batch: &OpponentBatch, ceiling: u32) -> f64 {
    if batch.games.is_empty() {
        return 0.0;
    }
    let total: f64 = batch
        .games
        .iter()
        .map(|g| result_score(&g.result, ceiling))
        .sum();
    total / batch.games.len() as f64
}

/// Weighted benchmark total, rounded to one decimal.
///
/// Only attempted opponents appear in `batches`; the rest add nothing, which
/// is the same as losing every game against them. Batches against names
/// missing from `opponents` carry no weight.
pub fn benchmark_score(batches: &[OpponentBatch], opponents: &OpponentSet, ceiling: u32) -> f64 {
    let total: f64 = batches
        .iter()
        .filter_map(|batch| {
            opponents
                .find(&batch.opponent)
                .map(|opp| batch_average(batch, ceiling) * f64::from(opp.weight))
        })
        .sum();
    round_to(total, 1)
}

/// Full breakdown of the attempted opponents, in ladder order
pub fn opponent_breakdown(
    batches: &[OpponentBatch],
    opponents: &OpponentSet,
    ceiling: u32,
) -> Vec<OpponentLine> {
    batches
        .iter()
        .map(|batch| {
            let mut stats = OpponentStats::tally(batch.games.iter().map(|g| &g.result));
            let avg = batch_average(batch, ceiling);
            let weight = opponents.find(&batch.opponent).map_or(0, |o| o.weight);
            stats.avg_game_score = Some(round_to(avg, 3));
            stats.weighted_points = Some(round_to(avg * f64::from(weight), 1));
            OpponentLine {
                opponent: batch.opponent.clone(),
                stats,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod aggregate_tests;
