//! On-disk run file schemas and their normalization.
//!
//! Two generations of run files exist:
//!
//! - **v1** (`"version": "1.0"`): the original two-anchor benchmark, plus the
//!   first tournament files. Scores are keyed by model, raw games are keyed by
//!   the anchor's agent identifier, and opponent weights may be missing
//!   entirely.
//! - **v2** (`"version": "2.0"`): written by this crate. Carries the ordered
//!   opponent list with weights, the elimination point and the per-opponent
//!   breakdown.
//!
//! Every file is parsed once into a [`VersionedRunFile`] and normalized into a
//! [`RunRecord`]. Nothing downstream looks at the schema again.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::aggregate::{OpponentLine, OpponentStats};
use crate::error::{Error, Result};
use crate::record::{ContestantRun, HeadToHeadGame, RunRecord, SchemaVersion};
use crate::types::{GameRecord, LadderFormat, MatchResult, Opponent, OpponentSet, RunConfig};

/// Anchors of the v1 benchmark, used when a v1 file does not list its own.
const V1_ANCHORS: [(&str, &str, u32, &str); 2] = [
    ("ai.RandomBiasedAI", "RandomBiasedAI", 40, "easy"),
    ("ai.abstraction.WorkerRush", "WorkerRush", 60, "hard"),
];

/// A single stored game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    #[serde(flatten)]
    pub result: MatchResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyAnchor {
    pub name: String,
    pub weight: u32,
    pub tier: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyDetail {
    /// Games keyed by the anchor's agent identifier
    pub reference_games: BTreeMap<String, Vec<StoredGame>>,
}

/// Per-team summary written by the first tournament runner
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyTeamResult {
    pub team_name: Option<String>,
    pub display_name: Option<String>,
    pub score: f64,
    pub eliminated_at: Option<String>,
    pub opponents: BTreeMap<String, OpponentStats>,
    pub date: Option<String>,
    pub map: Option<String>,
}

/// Version 1.0 run file (read only)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunFileV1 {
    pub format: Option<String>,
    pub date: String,
    pub config: RunConfig,
    pub anchors: BTreeMap<String, LegacyAnchor>,
    pub benchmark_scores: BTreeMap<String, f64>,
    pub detailed_results: BTreeMap<String, LegacyDetail>,
    pub results: Vec<LegacyTeamResult>,
    pub head_to_head: Vec<HeadToHeadGame>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredContestant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub games: Vec<StoredGame>,
}

/// Version 2.0 run file, the format this crate writes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFileV2 {
    pub version: String,
    pub format: LadderFormat,
    pub date: String,
    pub config: RunConfig,
    /// Opponents in ladder order
    pub anchors: Vec<Opponent>,
    pub benchmark_scores: BTreeMap<String, f64>,
    pub eliminated_at: BTreeMap<String, Option<String>>,
    pub opponent_breakdown: BTreeMap<String, BTreeMap<String, OpponentStats>>,
    pub detailed_results: BTreeMap<String, StoredContestant>,
    pub head_to_head: Vec<HeadToHeadGame>,
}

impl RunFileV2 {
    pub fn from_record(record: &RunRecord) -> Self {
        let mut file = Self {
            version: SchemaVersion::V2.as_str().to_string(),
            format: record.format,
            date: record.date.clone(),
            config: record.config.clone(),
            anchors: record.opponents.clone(),
            head_to_head: record.head_to_head.clone(),
            ..Default::default()
        };

        for c in &record.contestants {
            file.benchmark_scores.insert(c.model.clone(), c.score);
            file.eliminated_at
                .insert(c.model.clone(), c.eliminated_at.clone());
            file.opponent_breakdown.insert(
                c.model.clone(),
                c.breakdown
                    .iter()
                    .map(|line| (line.opponent.clone(), line.stats.clone()))
                    .collect(),
            );
            let games = c
                .games
                .iter()
                .map(|g| StoredGame {
                    game_num: Some(g.game_num),
                    opponent: Some(g.opponent.clone()),
                    result: g.result.clone(),
                })
                .collect();
            file.detailed_results.insert(
                c.model.clone(),
                StoredContestant {
                    agent: c.agent.clone(),
                    games,
                },
            );
        }
        file
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn normalize(self, source_file: &str) -> RunRecord {
        let RunFileV2 {
            format,
            date,
            config,
            anchors,
            benchmark_scores,
            mut eliminated_at,
            mut opponent_breakdown,
            mut detailed_results,
            head_to_head,
            ..
        } = self;

        let contestants = benchmark_scores
            .into_iter()
            .map(|(model, score)| {
                let stored = detailed_results.remove(&model).unwrap_or_default();
                let games = to_game_records(&model, stored.games, |g| {
                    g.opponent.clone().unwrap_or_default()
                });
                let breakdown = match opponent_breakdown.remove(&model) {
                    Some(map) => order_lines(map, &anchors),
                    None => tally_games(&games, &anchors),
                };
                ContestantRun {
                    eliminated_at: eliminated_at.remove(&model).flatten(),
                    agent: stored.agent,
                    model,
                    score,
                    breakdown,
                    games,
                }
            })
            .collect();

        RunRecord {
            version: SchemaVersion::V2,
            format,
            date,
            config,
            opponents: anchors,
            contestants,
            head_to_head,
            source_file: source_file.to_string(),
        }
    }
}

impl RunFileV1 {
    /// Resolve an anchor identifier to the opponent it stood for in this file
    fn resolve_anchor(&self, agent: &str) -> Opponent {
        if let Some(anchor) = self.anchors.get(agent) {
            let name = if anchor.name.is_empty() {
                short_name(agent)
            } else {
                anchor.name.clone()
            };
            return Opponent {
                name,
                agent: agent.to_string(),
                weight: anchor.weight,
                tier: anchor.tier.clone(),
            };
        }
        match V1_ANCHORS.iter().find(|(id, ..)| *id == agent) {
            Some((id, name, weight, tier)) => Opponent::new(name, id, *weight, tier),
            None => Opponent::new(&short_name(agent), agent, 0, ""),
        }
    }

    fn opponents(&self) -> Vec<Opponent> {
        let mut ids: Vec<&str> = if self.anchors.is_empty() {
            V1_ANCHORS.iter().map(|(id, ..)| *id).collect()
        } else {
            self.anchors.keys().map(String::as_str).collect()
        };
        for detail in self.detailed_results.values() {
            for id in detail.reference_games.keys() {
                if !ids.contains(&id.as_str()) {
                    ids.push(id.as_str());
                }
            }
        }

        let mut opponents: Vec<Opponent> = ids.into_iter().map(|id| self.resolve_anchor(id)).collect();
        opponents.sort_by_key(|o| (ladder_rank(o), o.name.clone()));
        opponents
    }

    fn normalize(self, source_file: &str) -> RunRecord {
        let opponents = self.opponents();
        let format = self
            .format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();

        let mut contestants: Vec<ContestantRun> = Vec::new();
        for (model, score) in &self.benchmark_scores {
            let mut games = Vec::new();
            if let Some(detail) = self.detailed_results.get(model) {
                let mut batches: Vec<(Opponent, &Vec<StoredGame>)> = detail
                    .reference_games
                    .iter()
                    .map(|(id, games)| (self.resolve_anchor(id), games))
                    .collect();
                batches.sort_by_key(|(o, _)| (position(&opponents, &o.name), o.name.clone()));
                for (opponent, stored) in batches {
                    games.extend(to_game_records(model, stored.clone(), |_| opponent.name.clone()));
                }
            }
            contestants.push(ContestantRun {
                model: model.clone(),
                agent: None,
                score: *score,
                eliminated_at: None,
                breakdown: tally_games(&games, &opponents),
                games,
            });
        }

        for team in &self.results {
            let model = match team.display_name.as_ref().or(team.team_name.as_ref()) {
                Some(name) => name.clone(),
                None => continue,
            };
            if contestants.iter().any(|c| c.model == model) {
                continue;
            }
            contestants.push(ContestantRun {
                model,
                agent: None,
                score: team.score,
                eliminated_at: team.eliminated_at.clone(),
                breakdown: order_lines(team.opponents.clone(), &opponents),
                games: Vec::new(),
            });
        }

        let first_team = self.results.first();
        let date = if self.date.is_empty() {
            first_team.and_then(|t| t.date.clone()).unwrap_or_default()
        } else {
            self.date.clone()
        };
        let mut config = self.config.clone();
        if config.map.is_empty() {
            if let Some(map) = first_team.and_then(|t| t.map.clone()) {
                config.map = map;
            }
        }

        RunRecord {
            version: SchemaVersion::V1,
            format,
            date,
            config,
            opponents,
            contestants,
            head_to_head: self.head_to_head,
            source_file: source_file.to_string(),
        }
    }
}

/// A run file of any supported schema
#[derive(Debug, Clone)]
pub enum VersionedRunFile {
    V1(RunFileV1),
    V2(RunFileV2),
}

impl VersionedRunFile {
    /// Parse a run file, dispatching on its `version` field.
    ///
    /// A missing version means 1.0, the only release that omitted it.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let version = match value.get("version") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => SchemaVersion::V1.as_str().to_string(),
        };
        match version.split('.').next().unwrap_or_default() {
            "1" => Ok(VersionedRunFile::V1(serde_json::from_value(value)?)),
            "2" => Ok(VersionedRunFile::V2(serde_json::from_value(value)?)),
            _ => Err(Error::UnsupportedVersion(version)),
        }
    }

    pub fn version(&self) -> SchemaVersion {
        match self {
            VersionedRunFile::V1(_) => SchemaVersion::V1,
            VersionedRunFile::V2(_) => SchemaVersion::V2,
        }
    }

    /// Convert to the canonical record. Recorded scores are kept as they are.
    pub fn normalize(self, source_file: &str) -> RunRecord {
        match self {
            VersionedRunFile::V1(file) => file.normalize(source_file),
            VersionedRunFile::V2(file) => file.normalize(source_file),
        }
    }
}

/// Parse and normalize in one step
pub fn parse_run_record(text: &str, source_file: &str) -> Result<RunRecord> {
    Ok(VersionedRunFile::from_json(text)?.normalize(source_file))
}

fn short_name(agent: &str) -> String {
    agent.rsplit('.').next().unwrap_or(agent).to_string()
}

/// Rank on the standard ladder; unknown opponents sort last
fn ladder_rank(opponent: &Opponent) -> usize {
    OpponentSet::standard()
        .iter()
        .position(|o| o.agent == opponent.agent || o.name == opponent.name)
        .unwrap_or(usize::MAX)
}

fn position(opponents: &[Opponent], name: &str) -> usize {
    opponents
        .iter()
        .position(|o| o.name == name)
        .unwrap_or(usize::MAX)
}

fn to_game_records(
    model: &str,
    stored: Vec<StoredGame>,
    opponent_of: impl Fn(&StoredGame) -> String,
) -> Vec<GameRecord> {
    stored
        .into_iter()
        .enumerate()
        .map(|(i, g)| GameRecord {
            contestant: model.to_string(),
            opponent: opponent_of(&g),
            game_num: g.game_num.unwrap_or(i as u32 + 1),
            result: g.result,
        })
        .collect()
}

/// Rebuild win/draw/loss counts from raw games, in ladder order
fn tally_games(games: &[GameRecord], opponents: &[Opponent]) -> Vec<OpponentLine> {
    let mut grouped: BTreeMap<String, Vec<&MatchResult>> = BTreeMap::new();
    for game in games {
        grouped
            .entry(game.opponent.clone())
            .or_default()
            .push(&game.result);
    }
    let tallies = grouped
        .into_iter()
        .map(|(name, results)| (name, OpponentStats::tally(results)))
        .collect();
    order_lines(tallies, opponents)
}

fn order_lines(map: BTreeMap<String, OpponentStats>, opponents: &[Opponent]) -> Vec<OpponentLine> {
    let mut lines: Vec<OpponentLine> = map
        .into_iter()
        .map(|(opponent, stats)| OpponentLine { opponent, stats })
        .collect();
    // Stable, so unknown opponents stay alphabetical after the known ones
    lines.sort_by_key(|line| position(opponents, &line.opponent));
    lines
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod schema_tests;
