//! Run files and the leaderboard artifact on disk.
//!
//! Run files are written once, through a temporary file in the same
//! directory, and never rewritten. The leaderboard is regenerated wholesale.

use bench_core::{parse_run_record, Leaderboard, RunFileV2, RunRecord};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Result, RunnerError};

pub const LEADERBOARD_FILE: &str = "leaderboard.json";

/// Prefixes of run files written by every arena version so far
pub const KNOWN_PREFIXES: &[&str] = &["benchmark", "tournament"];

const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `<prefix>_<YYYY-mm-dd_HH-MM-SS>.json`
pub fn run_file_name(prefix: &str, started: &NaiveDateTime) -> String {
    format!("{prefix}_{}.json", started.format(RUN_TIMESTAMP_FORMAT))
}

/// A directory of run files
#[derive(Debug, Clone)]
pub struct RunStore {
    dir: PathBuf,
    prefixes: Vec<String>,
}

impl RunStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefixes: KNOWN_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Also pick up run files named with `prefix`
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        if !self.prefixes.iter().any(|p| p == prefix) {
            self.prefixes.push(prefix.to_string());
        }
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_run_file(&self, name: &str) -> bool {
        name.ends_with(".json")
            && self.prefixes.iter().any(|prefix| {
                name.strip_prefix(prefix.as_str())
                    .map_or(false, |rest| rest.starts_with('_'))
            })
    }

    /// Run files in the directory, sorted by name. A missing directory has none.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "results directory does not exist");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(RunnerError::Read {
                    path: self.dir.clone(),
                    source,
                })
            }
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| self.is_run_file(n))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Load and normalize every run file. Unreadable files are skipped.
    pub fn load_runs(&self) -> Result<Vec<RunRecord>> {
        let mut runs = Vec::new();
        for path in self.discover()? {
            match load_run(&path) {
                Ok(run) => {
                    debug!(
                        file = %run.source_file,
                        version = %run.version,
                        contestants = run.contestants.len(),
                        "loaded run"
                    );
                    runs.push(run);
                }
                Err(e) => warn!(file = %path.display(), error = %e, "skipping run file"),
            }
        }
        Ok(runs)
    }

    /// Persist a fresh run. The file appears complete or not at all, and an
    /// existing run file is never replaced.
    pub fn write_run(&self, record: &RunRecord, prefix: &str, started: &NaiveDateTime) -> Result<PathBuf> {
        let path = self.dir.join(run_file_name(prefix, started));
        let json = RunFileV2::from_record(record).to_json_pretty()?;
        self.write_atomic(&path, &json, false)?;
        info!(path = %path.display(), "run saved");
        Ok(path)
    }

    pub fn write_leaderboard(&self, board: &Leaderboard) -> Result<PathBuf> {
        let path = self.dir.join(LEADERBOARD_FILE);
        self.write_atomic(&path, &board.to_json_pretty()?, true)?;
        info!(path = %path.display(), entries = board.entries.len(), "leaderboard saved");
        Ok(path)
    }

    fn write_atomic(&self, path: &Path, contents: &str, replace: bool) -> Result<()> {
        let write_err = |source: std::io::Error| RunnerError::Write {
            path: path.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        if replace {
            tmp.persist(path).map_err(|e| write_err(e.error))?;
        } else {
            tmp.persist_noclobber(path).map_err(|e| write_err(e.error))?;
        }
        Ok(())
    }
}

/// Read one run file of any schema version
pub fn load_run(path: &Path) -> Result<RunRecord> {
    let text = std::fs::read_to_string(path).map_err(|source| RunnerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(parse_run_record(&text, &name)?)
}

/// Load runs from several stores, in store order.
///
/// A file name found in more than one store is qualified with its store
/// directory so the merged sources stay distinct.
pub fn load_all_runs(stores: &[RunStore]) -> Result<Vec<RunRecord>> {
    let mut per_store = Vec::with_capacity(stores.len());
    for store in stores {
        per_store.push((store, store.load_runs()?));
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for run in per_store.iter().flat_map(|(_, runs)| runs) {
        *seen.entry(run.source_file.clone()).or_default() += 1;
    }

    let mut runs = Vec::new();
    for (store, loaded) in per_store {
        for mut run in loaded {
            if seen.get(&run.source_file).copied().unwrap_or(0) > 1 {
                run.source_file = store.dir().join(&run.source_file).display().to_string();
            }
            runs.push(run);
        }
    }
    Ok(runs)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
