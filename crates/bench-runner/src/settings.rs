//! Arena settings, read from `arena.toml`

use bench_core::{LadderConfig, LadderFormat, Opponent, OpponentSet, RunConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, RunnerError};

/// How the external game engine is launched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Program and leading arguments; `-f <config_file>` is appended
    pub command: Vec<String>,
    /// Key=value file the engine reads the match from
    pub config_file: PathBuf,
    /// Directory the engine runs in, the current one when unset
    pub working_dir: Option<PathBuf>,
    /// Wall clock budget per game
    pub timeout_secs: u64,
    pub env: BTreeMap<String, String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            command: ["java", "-cp", "lib/*:lib/bots/*:bin", "rts.MicroRTS"]
                .into_iter()
                .map(String::from)
                .collect(),
            config_file: PathBuf::from("resources/config.properties"),
            working_dir: None,
            timeout_secs: 900,
            env: BTreeMap::new(),
        }
    }
}

impl EngineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub results_dir: PathBuf,
    pub submissions_dir: PathBuf,
    /// File name prefix of run records
    pub run_prefix: String,
    pub map: String,
    pub max_cycles: u32,
    pub games_per_matchup: u32,
    pub format: LadderFormat,
    /// Play every pair of contestants against each other after the ladders
    pub head_to_head: bool,
    pub engine: EngineSettings,
    /// Ladder in order of difficulty
    pub opponents: Vec<Opponent>,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("tournament_results"),
            submissions_dir: PathBuf::from("submissions"),
            run_prefix: "tournament".to_string(),
            map: "maps/8x8/basesWorkers8x8.xml".to_string(),
            max_cycles: 1500,
            games_per_matchup: 1,
            format: LadderFormat::SingleElimination,
            head_to_head: true,
            engine: EngineSettings::default(),
            opponents: OpponentSet::standard().as_slice().to_vec(),
        }
    }
}

impl ArenaSettings {
    /// Load settings from `path`. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(RunnerError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_toml(&text).map_err(|source| RunnerError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Validated opponent ladder
    pub fn opponent_set(&self) -> Result<OpponentSet> {
        let set = OpponentSet::new(self.opponents.clone())?;
        if set.total_weight() != 100 {
            warn!(
                total = set.total_weight(),
                "opponent weights do not sum to 100, scores are not on the usual scale"
            );
        }
        Ok(set)
    }

    pub fn ladder_config(&self) -> LadderConfig {
        LadderConfig {
            format: self.format,
            games_per_matchup: self.games_per_matchup,
            max_cycles: self.max_cycles,
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            map: self.map.clone(),
            max_cycles: self.max_cycles,
            games_per_matchup: self.games_per_matchup,
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod settings_tests;
