//! Canonical run record, independent of the file schema it came from

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregate::{opponent_breakdown, OpponentLine};
use crate::ladder::LadderOutcome;
use crate::types::{GameRecord, LadderFormat, MatchResult, Opponent, OpponentSet, RunConfig};

/// Scoring protocol a run was recorded under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// Two opponents (40/60), every opponent always played
    #[serde(rename = "1.0")]
    V1,
    /// Ordered opponent list with weights, single elimination or full
    #[serde(rename = "2.0")]
    V2,
}

impl SchemaVersion {
    pub const LATEST: SchemaVersion = SchemaVersion::V2;

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVersion::V1 => "1.0",
            SchemaVersion::V2 => "2.0",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A direct game between two contestants, from player 0's side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadGame {
    #[serde(default)]
    pub player0: String,
    #[serde(default)]
    pub player1: String,
    #[serde(flatten)]
    pub result: MatchResult,
}

/// One contestant's part of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ContestantRun {
    pub model: String,
    pub agent: Option<String>,
    /// Score as recorded by the run, never recomputed
    pub score: f64,
    pub eliminated_at: Option<String>,
    /// Per-opponent tallies in ladder order
    pub breakdown: Vec<OpponentLine>,
    /// Raw games; empty when the run only stored summaries
    pub games: Vec<GameRecord>,
}

/// One persisted execution of the ladder
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub version: SchemaVersion,
    pub format: LadderFormat,
    /// ISO-8601 local timestamp; empty when the file had none
    pub date: String,
    pub config: RunConfig,
    /// Opponents with the weights this run was scored under
    pub opponents: Vec<Opponent>,
    pub contestants: Vec<ContestantRun>,
    pub head_to_head: Vec<HeadToHeadGame>,
    /// File the record was loaded from, empty for a fresh run
    pub source_file: String,
}

impl RunRecord {
    /// Assemble a fresh run from finished ladders.
    pub fn from_outcomes(
        format: LadderFormat,
        date: String,
        config: RunConfig,
        opponents: &OpponentSet,
        outcomes: Vec<LadderOutcome>,
        head_to_head: Vec<HeadToHeadGame>,
    ) -> Self {
        let contestants = outcomes
            .into_iter()
            .map(|outcome| {
                let breakdown = opponent_breakdown(&outcome.batches, opponents, config.max_cycles);
                let games = outcome.games().cloned().collect();
                ContestantRun {
                    model: outcome.contestant.name,
                    agent: Some(outcome.contestant.agent),
                    score: outcome.score,
                    eliminated_at: outcome.eliminated_at,
                    breakdown,
                    games,
                }
            })
            .collect();

        Self {
            version: SchemaVersion::LATEST,
            format,
            date,
            config,
            opponents: opponents.as_slice().to_vec(),
            contestants,
            head_to_head,
            source_file: String::new(),
        }
    }

    pub fn contestant(&self, model: &str) -> Option<&ContestantRun> {
        self.contestants.iter().find(|c| c.model == model)
    }

    /// Weight of a named opponent under this run's own scoring
    pub fn weight_of(&self, opponent: &str) -> Option<u32> {
        self.opponents
            .iter()
            .find(|o| o.name == opponent)
            .map(|o| o.weight)
    }
}
