//! Runs a whole tournament: every contestant up the ladder, then the
//! optional head-to-head round, assembled into one run record.

use bench_core::{
    run_ladder, Contestant, HeadToHeadGame, LadderConfig, LadderFormat, LadderOutcome,
    MatchPlayer, MatchSpec, OpponentSet, RunConfig, RunRecord,
};
use chrono::NaiveDateTime;
use tracing::{info, info_span};

use crate::error::Result;
use crate::settings::ArenaSettings;

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Drives a [`MatchPlayer`] through a tournament
pub struct Orchestrator<P> {
    player: P,
    opponents: OpponentSet,
    ladder: LadderConfig,
    config: RunConfig,
    head_to_head: bool,
}

impl<P: MatchPlayer> Orchestrator<P> {
    pub fn new(player: P, opponents: OpponentSet, ladder: LadderConfig, config: RunConfig) -> Self {
        Self {
            player,
            opponents,
            ladder,
            config,
            head_to_head: false,
        }
    }

    pub fn from_settings(player: P, settings: &ArenaSettings) -> Result<Self> {
        Ok(Self::new(
            player,
            settings.opponent_set()?,
            settings.ladder_config(),
            settings.run_config(),
        )
        .with_head_to_head(settings.head_to_head))
    }

    pub fn with_head_to_head(mut self, enabled: bool) -> Self {
        self.head_to_head = enabled;
        self
    }

    pub fn format(&self) -> LadderFormat {
        self.ladder.format
    }

    pub fn opponents(&self) -> &OpponentSet {
        &self.opponents
    }

    pub fn into_player(self) -> P {
        self.player
    }

    /// Ladder of every contestant, in the given order
    pub fn run_ladders(&mut self, contestants: &[Contestant]) -> Result<Vec<LadderOutcome>> {
        let mut outcomes = Vec::with_capacity(contestants.len());
        for contestant in contestants {
            let _span = info_span!("ladder", contestant = %contestant.name).entered();
            info!(agent = %contestant.agent, format = %self.ladder.format, "starting ladder");

            let outcome = run_ladder(&mut self.player, contestant, &self.opponents, &self.ladder)?;
            for batch in &outcome.batches {
                info!(
                    opponent = %batch.opponent,
                    wins = batch.wins(),
                    games = batch.games.len(),
                    "opponent done"
                );
            }
            match &outcome.eliminated_at {
                Some(opponent) => info!(%opponent, score = outcome.score, "eliminated"),
                None => info!(score = outcome.score, "cleared all opponents"),
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Every pair of contestants, each pair playing the configured number of
    /// games with the earlier contestant as player 0
    pub fn run_head_to_head(&mut self, contestants: &[Contestant]) -> Result<Vec<HeadToHeadGame>> {
        let mut games = Vec::new();
        for (i, first) in contestants.iter().enumerate() {
            for second in &contestants[i + 1..] {
                let mut env = second.env.clone();
                env.extend(first.env.clone());
                let spec = MatchSpec {
                    player0: first.agent.clone(),
                    player1: second.agent.clone(),
                    max_cycles: self.ladder.max_cycles,
                    env,
                };
                for _ in 0..self.ladder.games_per_matchup {
                    let result = self.player.play(&spec)?;
                    info!(
                        player0 = %first.name,
                        player1 = %second.name,
                        outcome = %result.outcome,
                        "head-to-head game"
                    );
                    games.push(HeadToHeadGame {
                        player0: first.name.clone(),
                        player1: second.name.clone(),
                        result,
                    });
                }
            }
        }
        Ok(games)
    }

    /// Full tournament started at `started`
    pub fn run(&mut self, contestants: &[Contestant], started: &NaiveDateTime) -> Result<RunRecord> {
        let outcomes = self.run_ladders(contestants)?;
        let head_to_head = if self.head_to_head && contestants.len() > 1 {
            self.run_head_to_head(contestants)?
        } else {
            Vec::new()
        };
        Ok(RunRecord::from_outcomes(
            self.ladder.format,
            started.format(DATE_FORMAT).to_string(),
            self.config.clone(),
            &self.opponents,
            outcomes,
            head_to_head,
        ))
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod orchestrator_tests;
