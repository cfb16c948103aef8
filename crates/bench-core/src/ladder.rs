//! Elimination ladder: a contestant climbs the opponents in fixed order

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::benchmark_score;
use crate::error::{Error, Result};
use crate::types::{
    Contestant, GameRecord, LadderFormat, MatchResult, Opponent, OpponentSet, Outcome,
};

/// Everything the game engine needs for one game.
///
/// Player 0 is always the contestant; results are reported from its side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpec {
    pub player0: String,
    pub player1: String,
    pub max_cycles: u32,
    /// Environment added to the engine process
    pub env: BTreeMap<String, String>,
}

/// Plays single games.
///
/// Implementations must contain every per-game failure (timeouts, crashes,
/// unreadable output) in the returned [`MatchResult`]. An `Err` means the
/// game could not even be set up and aborts the whole run.
pub trait MatchPlayer {
    fn play(&mut self, spec: &MatchSpec) -> Result<MatchResult>;
}

/// Position of a contestant on the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderState {
    /// Next to face the opponent at this rank
    Active(usize),
    /// Stopped after a batch without a win against this rank
    Eliminated(usize),
    /// Every opponent has been attempted
    Cleared,
}

/// All games played against one opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentBatch {
    pub opponent: String,
    pub games: Vec<GameRecord>,
}

impl OpponentBatch {
    pub fn wins(&self) -> usize {
        self.count(Outcome::Win)
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.games
            .iter()
            .filter(|g| g.result.outcome == outcome)
            .count()
    }
}

/// Finished ladder of one contestant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderOutcome {
    pub contestant: Contestant,
    /// Batches in ladder order; a prefix of the opponent set when eliminated
    pub batches: Vec<OpponentBatch>,
    /// Opponent that ended the climb, `None` if cleared
    pub eliminated_at: Option<String>,
    pub score: f64,
}

impl LadderOutcome {
    pub fn games(&self) -> impl Iterator<Item = &GameRecord> {
        self.batches.iter().flat_map(|b| b.games.iter())
    }
}

/// Ladder state machine for one contestant
#[derive(Debug, Clone)]
pub struct Ladder<'a> {
    contestant: Contestant,
    opponents: &'a OpponentSet,
    format: LadderFormat,
    state: LadderState,
    batches: Vec<OpponentBatch>,
}

impl<'a> Ladder<'a> {
    pub fn new(contestant: Contestant, opponents: &'a OpponentSet, format: LadderFormat) -> Self {
        Self {
            contestant,
            opponents,
            format,
            state: LadderState::Active(0),
            batches: Vec::new(),
        }
    }

    pub fn state(&self) -> LadderState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.state, LadderState::Active(_))
    }

    /// Opponent to play next, `None` once the ladder is finished
    pub fn current_opponent(&self) -> Option<&'a Opponent> {
        match self.state {
            LadderState::Active(rank) => self.opponents.get(rank),
            _ => None,
        }
    }

    /// Record the full batch against the current opponent and advance.
    ///
    /// The batch always counts in full, even when an early game was won.
    pub fn record_batch(&mut self, results: Vec<MatchResult>) -> Result<LadderState> {
        let rank = match self.state {
            LadderState::Active(rank) => rank,
            _ => return Err(Error::LadderFinished(self.contestant.name.clone())),
        };
        let opponent = match self.opponents.get(rank) {
            Some(opponent) => opponent,
            None => return Err(Error::LadderFinished(self.contestant.name.clone())),
        };
        if results.is_empty() {
            return Err(Error::EmptyBatch(opponent.name.clone()));
        }

        let games: Vec<GameRecord> = results
            .into_iter()
            .enumerate()
            .map(|(i, result)| GameRecord {
                contestant: self.contestant.name.clone(),
                opponent: opponent.name.clone(),
                game_num: i as u32 + 1,
                result,
            })
            .collect();
        let batch = OpponentBatch {
            opponent: opponent.name.clone(),
            games,
        };
        let advanced = batch.wins() > 0 || self.format == LadderFormat::Full;
        self.batches.push(batch);

        self.state = if !advanced {
            LadderState::Eliminated(rank)
        } else if rank + 1 >= self.opponents.len() {
            LadderState::Cleared
        } else {
            LadderState::Active(rank + 1)
        };
        Ok(self.state)
    }

    /// Close the ladder and score it. Unattempted opponents contribute zero.
    pub fn finish(self, ceiling: u32) -> LadderOutcome {
        let eliminated_at = match self.state {
            LadderState::Eliminated(rank) => self.opponents.get(rank).map(|o| o.name.clone()),
            _ => None,
        };
        let score = benchmark_score(&self.batches, self.opponents, ceiling);
        LadderOutcome {
            contestant: self.contestant,
            batches: self.batches,
            eliminated_at,
            score,
        }
    }
}

/// How a ladder is played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderConfig {
    pub format: LadderFormat,
    pub games_per_matchup: u32,
    pub max_cycles: u32,
}

/// Drive `contestant` up the ladder, one game at a time, in opponent order.
pub fn run_ladder(
    player: &mut dyn MatchPlayer,
    contestant: &Contestant,
    opponents: &OpponentSet,
    config: &LadderConfig,
) -> Result<LadderOutcome> {
    if config.games_per_matchup == 0 {
        return Err(Error::NoGames);
    }

    let mut ladder = Ladder::new(contestant.clone(), opponents, config.format);
    while let Some(opponent) = ladder.current_opponent() {
        let spec = MatchSpec {
            player0: contestant.agent.clone(),
            player1: opponent.agent.clone(),
            max_cycles: config.max_cycles,
            env: contestant.env.clone(),
        };
        let mut results = Vec::with_capacity(config.games_per_matchup as usize);
        for _ in 0..config.games_per_matchup {
            results.push(player.play(&spec)?);
        }
        ladder.record_batch(results)?;
    }
    Ok(ladder.finish(config.max_cycles))
}

#[cfg(test)]
#[path = "ladder_tests.rs"]
mod ladder_tests;
