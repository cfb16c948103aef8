//! Shared data model: outcomes, games, opponents and run configuration

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Result of a single game, always from player 0's (the contestant's) side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    Timeout,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
            Outcome::Timeout => "timeout",
            Outcome::Error => "error",
        }
    }

    pub fn is_win(self) -> bool {
        self == Outcome::Win
    }
}

/// Unrecognized labels in historical files count as errors: they carry no
/// verdict, and an error scores like a loss.
impl From<String> for Outcome {
    fn from(label: String) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "win" => Outcome::Win,
            "loss" => Outcome::Loss,
            "draw" => Outcome::Draw,
            "timeout" => Outcome::Timeout,
            _ => Outcome::Error,
        }
    }
}

impl From<Outcome> for &'static str {
    fn from(outcome: Outcome) -> Self {
        outcome.as_str()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

fn missing_outcome() -> Outcome {
    Outcome::Error
}

/// Terminal result of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "result", default = "missing_outcome")]
    pub outcome: Outcome,
    /// Game length in engine ticks
    #[serde(default)]
    pub ticks: u32,
    /// Diagnostic for errored games
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchResult {
    pub fn new(outcome: Outcome, ticks: u32) -> Self {
        Self {
            outcome,
            ticks,
            error: None,
        }
    }

    pub fn win(ticks: u32) -> Self {
        Self::new(Outcome::Win, ticks)
    }

    pub fn loss(ticks: u32) -> Self {
        Self::new(Outcome::Loss, ticks)
    }

    pub fn draw(ticks: u32) -> Self {
        Self::new(Outcome::Draw, ticks)
    }

    /// A timed-out game is charged the full cycle ceiling.
    pub fn timeout(ceiling: u32) -> Self {
        Self::new(Outcome::Timeout, ceiling)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Error,
            ticks: 0,
            error: Some(message.into()),
        }
    }
}

/// One game of a contestant against a named opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub contestant: String,
    pub opponent: String,
    /// 1-based index within the batch against this opponent
    pub game_num: u32,
    #[serde(flatten)]
    pub result: MatchResult,
}

/// A competing agent: a display name and the identifier the engine loads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub name: String,
    pub agent: String,
    /// Extra environment for every game this contestant plays
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Contestant {
    pub fn new(name: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent: agent.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// A fixed reference agent on the ladder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opponent {
    pub name: String,
    /// Identifier the game engine loads for this opponent
    #[serde(default)]
    pub agent: String,
    /// Points available for this opponent
    pub weight: u32,
    #[serde(default)]
    pub tier: String,
}

impl Opponent {
    pub fn new(name: &str, agent: &str, weight: u32, tier: &str) -> Self {
        Self {
            name: name.to_string(),
            agent: agent.to_string(),
            weight,
            tier: tier.to_string(),
        }
    }
}

/// Ordered, validated ladder of opponents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentSet {
    opponents: Vec<Opponent>,
}

impl OpponentSet {
    /// Build a ladder; the order of `opponents` is the order they are faced.
    pub fn new(opponents: Vec<Opponent>) -> Result<Self> {
        if opponents.is_empty() {
            return Err(Error::EmptyOpponentSet);
        }
        let mut seen = HashSet::new();
        for opp in &opponents {
            if opp.weight == 0 {
                return Err(Error::InvalidWeight(opp.name.clone()));
            }
            if !seen.insert(opp.name.as_str()) {
                return Err(Error::DuplicateOpponent(opp.name.clone()));
            }
        }
        Ok(Self { opponents })
    }

    pub fn len(&self) -> usize {
        self.opponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opponents.is_empty()
    }

    pub fn get(&self, rank: usize) -> Option<&Opponent> {
        self.opponents.get(rank)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Opponent> {
        self.opponents.iter()
    }

    pub fn as_slice(&self) -> &[Opponent] {
        &self.opponents
    }

    /// Sum of all weights; the maximum attainable score is 1.2 times this.
    pub fn total_weight(&self) -> u32 {
        self.opponents.iter().map(|o| o.weight).sum()
    }

    pub fn find(&self, name: &str) -> Option<&Opponent> {
        self.opponents.iter().find(|o| o.name == name)
    }

    /// The six-opponent single-elimination ladder, 100 points in total.
    pub fn standard() -> Self {
        Self {
            opponents: vec![
                Opponent::new("RandomBiasedAI", "ai.RandomBiasedAI", 10, "easy"),
                Opponent::new("HeavyRush", "ai.abstraction.HeavyRush", 20, "medium-hard"),
                Opponent::new("LightRush", "ai.abstraction.LightRush", 15, "medium"),
                Opponent::new("WorkerRush", "ai.abstraction.WorkerRush", 15, "medium"),
                Opponent::new("Tiamat", "ai.competition.tiamat.Tiamat", 20, "hard"),
                Opponent::new("CoacAI", "ai.coac.CoacAI", 20, "hard"),
            ],
        }
    }
}

/// How a ladder reacts to a batch without a win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LadderFormat {
    /// Every opponent is always attempted
    #[default]
    Full,
    /// A batch without a win ends the climb
    SingleElimination,
}

impl LadderFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LadderFormat::Full => "full",
            LadderFormat::SingleElimination => "single-elimination",
        }
    }
}

impl fmt::Display for LadderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LadderFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(LadderFormat::Full),
            "single-elimination" | "single_elimination" | "elimination" => {
                Ok(LadderFormat::SingleElimination)
            }
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

/// Engine-facing parameters recorded with each run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub map: String,
    /// Cycle ceiling: games still running here end in a draw
    pub max_cycles: u32,
    pub games_per_matchup: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            map: String::new(),
            max_cycles: 0,
            games_per_matchup: 1,
        }
    }
}
