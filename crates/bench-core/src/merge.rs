//! Leaderboard merge: best run per model, history and head-to-head matrix.
//!
//! The merge is a pure function of the set of runs. Input order never
//! matters: every choice is made by a total order over the candidates, and
//! every collection in the output is sorted, so the same files always give
//! the same bytes.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::aggregate::OpponentLine;
use crate::error::Result;
use crate::record::{ContestantRun, HeadToHeadGame, RunRecord, SchemaVersion};
use crate::score::Grade;
use crate::types::{LadderFormat, Outcome};

/// Best run of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub model: String,
    pub score: f64,
    pub grade: Grade,
    pub version: SchemaVersion,
    pub format: LadderFormat,
    pub eliminated_at: Option<String>,
    pub date: String,
    pub map: String,
    pub games_per_matchup: u32,
    pub opponents: Vec<OpponentLine>,
    pub source_file: String,
}

/// One model's result in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub model: String,
    pub score: f64,
    pub grade: Grade,
    pub version: SchemaVersion,
    pub format: LadderFormat,
    pub date: String,
    pub map: String,
    pub source_file: String,
}

/// Direct results of one contestant against another
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHeadRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl HeadToHeadRecord {
    const WIN: Self = Self { wins: 1, losses: 0, draws: 0 };
    const LOSS: Self = Self { wins: 0, losses: 1, draws: 0 };
    const DRAW: Self = Self { wins: 0, losses: 0, draws: 1 };

    fn add(&mut self, other: Self) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.draws += other.draws;
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// Symmetric win/loss/draw matrix between contestants.
///
/// Only ever incremented: `a` vs `b` and `b` vs `a` always mirror each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadToHeadMatrix {
    cells: BTreeMap<String, BTreeMap<String, HeadToHeadRecord>>,
}

impl HeadToHeadMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one direct game. Returns false for games that carry no verdict
    /// (timeouts, errors) or name the same player twice.
    pub fn record(&mut self, game: &HeadToHeadGame) -> bool {
        let (p0, p1) = (game.player0.as_str(), game.player1.as_str());
        if p0.is_empty() || p1.is_empty() || p0 == p1 {
            return false;
        }
        let (mine, theirs) = match game.result.outcome {
            Outcome::Win => (HeadToHeadRecord::WIN, HeadToHeadRecord::LOSS),
            Outcome::Loss => (HeadToHeadRecord::LOSS, HeadToHeadRecord::WIN),
            Outcome::Draw => (HeadToHeadRecord::DRAW, HeadToHeadRecord::DRAW),
            Outcome::Timeout | Outcome::Error => return false,
        };
        self.cell_mut(p0, p1).add(mine);
        self.cell_mut(p1, p0).add(theirs);
        true
    }

    pub fn get(&self, player: &str, opponent: &str) -> Option<&HeadToHeadRecord> {
        self.cells.get(player).and_then(|row| row.get(opponent))
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn cell_mut(&mut self, player: &str, opponent: &str) -> &mut HeadToHeadRecord {
        self.cells
            .entry(player.to_string())
            .or_default()
            .entry(opponent.to_string())
            .or_default()
    }
}

/// Output of a merge pass. Derived data only; rebuilt from the run files
/// every time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub description: String,
    /// Run files that contributed, sorted
    pub sources: Vec<String>,
    pub entries: Vec<LeaderboardEntry>,
    pub history: Vec<HistoryEntry>,
    pub head_to_head: HeadToHeadMatrix,
}

impl Leaderboard {
    pub fn entry(&self, model: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.model == model)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One (run, contestant) pair competing for a model's slot
#[derive(Clone, Copy)]
struct Candidate<'a> {
    run: &'a RunRecord,
    contestant: &'a ContestantRun,
}

impl Candidate<'_> {
    /// Score, then schema version, then timestamp, then file name
    fn cmp_preference(&self, other: &Self) -> Ordering {
        self.contestant
            .score
            .total_cmp(&other.contestant.score)
            .then_with(|| self.run.version.cmp(&other.run.version))
            .then_with(|| self.run.date.cmp(&other.run.date))
            .then_with(|| self.run.source_file.cmp(&other.run.source_file))
    }
}

/// Pick the best run per model across all runs
pub fn best_per_model(runs: &[RunRecord]) -> BTreeMap<&str, (&RunRecord, &ContestantRun)> {
    let mut best: BTreeMap<&str, Candidate<'_>> = BTreeMap::new();
    for run in runs {
        for contestant in &run.contestants {
            let candidate = Candidate { run, contestant };
            best.entry(contestant.model.as_str())
                .and_modify(|current| {
                    if candidate.cmp_preference(current) == Ordering::Greater {
                        *current = candidate;
                    }
                })
                .or_insert(candidate);
        }
    }
    best.into_iter()
        .map(|(model, c)| (model, (c.run, c.contestant)))
        .collect()
}

/// Every (run, model) result, newest first
pub fn build_history(runs: &[RunRecord]) -> Vec<HistoryEntry> {
    let mut history: Vec<HistoryEntry> = runs
        .iter()
        .flat_map(|run| {
            run.contestants.iter().map(move |c| HistoryEntry {
                model: c.model.clone(),
                score: c.score,
                grade: Grade::from_score(c.score),
                version: run.version,
                format: run.format,
                date: run.date.clone(),
                map: run.config.map.clone(),
                source_file: run.source_file.clone(),
            })
        })
        .collect();
    history.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.model.cmp(&b.model))
            .then_with(|| a.source_file.cmp(&b.source_file))
            .then_with(|| b.score.total_cmp(&a.score))
    });
    history
}

/// Sum every direct game of every run into one matrix
pub fn build_head_to_head(runs: &[RunRecord]) -> HeadToHeadMatrix {
    let mut matrix = HeadToHeadMatrix::new();
    for run in runs {
        for game in &run.head_to_head {
            matrix.record(game);
        }
    }
    matrix
}

/// Merge runs of any schema into one leaderboard.
pub fn merge_runs(runs: &[RunRecord]) -> Leaderboard {
    let mut entries: Vec<LeaderboardEntry> = best_per_model(runs)
        .into_iter()
        .map(|(model, (run, c))| LeaderboardEntry {
            rank: 0,
            model: model.to_string(),
            score: c.score,
            grade: Grade::from_score(c.score),
            version: run.version,
            format: run.format,
            eliminated_at: c.eliminated_at.clone(),
            date: run.date.clone(),
            map: run.config.map.clone(),
            games_per_matchup: run.config.games_per_matchup,
            opponents: c.breakdown.clone(),
            source_file: run.source_file.clone(),
        })
        .collect();
    entries.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.model.cmp(&b.model)));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    let mut sources: Vec<String> = runs.iter().map(|r| r.source_file.clone()).collect();
    sources.sort();
    sources.dedup();

    Leaderboard {
        description: "Best benchmark score per model across all runs".to_string(),
        sources,
        entries,
        history: build_history(runs),
        head_to_head: build_head_to_head(runs),
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod merge_tests;
