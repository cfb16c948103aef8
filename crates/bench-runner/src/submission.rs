//! Contestant submissions: one directory per team with a `metadata.json`

use bench_core::Contestant;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, RunnerError};

pub const MANIFEST_FILE: &str = "metadata.json";
pub const AGENT_PACKAGE: &str = "ai.abstraction.submissions";
pub const VALID_PROVIDERS: &[&str] = &["ollama", "gemini", "openai", "deepseek", "none"];

const TEMPLATE_DIR: &str = "_template";

static TEAM_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap());

/// Contents of `metadata.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub team_name: String,
    pub display_name: String,
    pub agent_class: String,
    pub agent_file: String,
    pub model_provider: String,
    pub model_name: String,
    /// Extra environment for the agent's games
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Manifest {
    fn required_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("team_name", self.team_name.as_str()),
            ("display_name", self.display_name.as_str()),
            ("agent_class", self.agent_class.as_str()),
            ("agent_file", self.agent_file.as_str()),
            ("model_provider", self.model_provider.as_str()),
            ("model_name", self.model_name.as_str()),
        ]
    }

    /// Every problem with the manifest of the submission in `folder`
    pub fn problems(&self, folder: &str) -> Vec<String> {
        let mut problems: Vec<String> = self
            .required_fields()
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| format!("field '{field}' is empty"))
            .collect();
        if !problems.is_empty() {
            return problems;
        }

        if self.team_name != folder {
            problems.push(format!(
                "team_name '{}' does not match folder name '{folder}'",
                self.team_name
            ));
        }
        if !TEAM_NAME_RE.is_match(&self.team_name) {
            problems.push(format!(
                "team_name must be lowercase alphanumeric with hyphens: '{}'",
                self.team_name
            ));
        }
        if !VALID_PROVIDERS.contains(&self.model_provider.as_str()) {
            problems.push(format!(
                "model_provider must be one of {VALID_PROVIDERS:?}, got '{}'",
                self.model_provider
            ));
        }
        problems
    }
}

/// A validated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub dir: PathBuf,
    pub manifest: Manifest,
}

impl Submission {
    /// Java package of the agent: the team name with `-` turned into `_`
    pub fn package(&self) -> String {
        format!("{AGENT_PACKAGE}.{}", self.manifest.team_name.replace('-', "_"))
    }

    /// Fully qualified class the engine loads
    pub fn agent_id(&self) -> String {
        format!("{}.{}", self.package(), self.manifest.agent_class)
    }

    pub fn agent_path(&self) -> PathBuf {
        self.dir.join(&self.manifest.agent_file)
    }

    pub fn contestant(&self) -> Contestant {
        let mut contestant = Contestant::new(&self.manifest.display_name, self.agent_id());
        contestant.env = self.manifest.env.clone();
        if self.manifest.model_provider == "ollama" {
            contestant
                .env
                .entry("OLLAMA_MODEL".to_string())
                .or_insert_with(|| self.manifest.model_name.clone());
        }
        contestant
    }

    /// Read and validate the submission in `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let folder = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = dir.join(MANIFEST_FILE);
        let text = std::fs::read_to_string(&path).map_err(|source| RunnerError::Read {
            path: path.clone(),
            source,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&text).map_err(|source| RunnerError::Manifest { path, source })?;

        let problems = manifest.problems(&folder);
        if !problems.is_empty() {
            return Err(RunnerError::Submission {
                dir: dir.to_path_buf(),
                reason: problems.join("; "),
            });
        }
        let submission = Self {
            dir: dir.to_path_buf(),
            manifest,
        };
        if !submission.agent_path().is_file() {
            return Err(RunnerError::Submission {
                dir: dir.to_path_buf(),
                reason: format!("agent file not found: {}", submission.manifest.agent_file),
            });
        }
        Ok(submission)
    }
}

/// Submission directories under `root`, sorted by name
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root).map_err(|source| RunnerError::Read {
        path: root.to_path_buf(),
        source,
    })?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            name != TEMPLATE_DIR && !name.starts_with('.')
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Load every valid submission under `root`. Invalid ones are skipped with
/// a warning.
pub fn load_all(root: &Path) -> Result<Vec<Submission>> {
    let mut submissions: Vec<Submission> = Vec::new();
    let mut names = HashSet::new();
    for dir in discover(root)? {
        match Submission::load(&dir) {
            // Display names key the persisted results, so the first one wins
            Ok(submission) if !names.insert(submission.manifest.display_name.clone()) => warn!(
                dir = %dir.display(),
                display_name = %submission.manifest.display_name,
                "skipping submission with duplicate display name"
            ),
            Ok(submission) => {
                debug!(team = %submission.manifest.team_name, agent = %submission.agent_id(), "submission loaded");
                submissions.push(submission);
            }
            Err(e) => warn!(dir = %dir.display(), error = %e, "skipping submission"),
        }
    }
    Ok(submissions)
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod submission_tests;
