//! Running one game in the external engine process.
//!
//! The engine reads its match from a shared configuration file, so only one
//! game may be in flight per process. [`MATCH_LOCK`] is held from the moment
//! the file is rewritten until the child has been reaped.

use bench_core::{MatchPlayer, MatchResult, MatchSpec};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{Result, RunnerError};
use crate::game_config::write_match_config;
use crate::settings::EngineSettings;
use crate::verdict::VerdictParser;

/// Serializes every write of the match configuration and the game that reads it
pub static MATCH_LOCK: Mutex<()> = Mutex::new(());

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// [`MatchPlayer`] backed by the external game engine
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
    config_file: PathBuf,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
    timeout: Duration,
    parser: VerdictParser,
}

impl ProcessEngine {
    pub fn new(settings: &EngineSettings) -> Result<Self> {
        let (program, args) = settings
            .command
            .split_first()
            .ok_or(RunnerError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            config_file: settings.config_file.clone(),
            working_dir: settings.working_dir.clone(),
            env: settings.env.clone(),
            timeout: settings.timeout(),
            parser: VerdictParser::default(),
        })
    }

    pub fn with_parser(mut self, parser: VerdictParser) -> Self {
        self.parser = parser;
        self
    }

    /// Configuration file as seen from this process
    fn config_path(&self) -> PathBuf {
        match &self.working_dir {
            Some(dir) if self.config_file.is_relative() => dir.join(&self.config_file),
            _ => self.config_file.clone(),
        }
    }

    fn command(&self, spec: &MatchSpec) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-f")
            .arg(&self.config_file)
            .envs(&self.env)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Spawn, wait and judge. Every failure here ends up in the result.
    fn run_game(&self, spec: &MatchSpec) -> MatchResult {
        let mut child = match self.command(spec).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %self.program, error = %e, "failed to start engine");
                return MatchResult::error(format!("failed to start {}: {e}", self.program));
            }
        };
        let deadline = Instant::now() + self.timeout;
        let (tx, rx) = mpsc::channel();
        let mut readers = 0;
        if let Some(pipe) = child.stdout.take() {
            capture(Stream::Stdout, pipe, tx.clone());
            readers += 1;
        }
        if let Some(pipe) = child.stderr.take() {
            capture(Stream::Stderr, pipe, tx.clone());
            readers += 1;
        }
        drop(tx);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                warn!(
                    player0 = %spec.player0,
                    player1 = %spec.player1,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "game timed out, engine killed"
                );
                return MatchResult::timeout(spec.max_cycles);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return MatchResult::error(format!("failed to wait for engine: {e}"));
            }
        };

        // A descendant still holding the pipes counts against the same budget
        let output = match collect_output(&rx, readers, deadline) {
            Some(output) => output,
            None => {
                warn!(
                    player0 = %spec.player0,
                    player1 = %spec.player1,
                    %status,
                    "engine output still open at the deadline"
                );
                return MatchResult::timeout(spec.max_cycles);
            }
        };
        self.judge(status, &output, spec.max_cycles)
    }

    fn judge(&self, status: ExitStatus, output: &str, ceiling: u32) -> MatchResult {
        if !status.success() && self.parser.winner(output).is_none() {
            let last_line = output.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
            debug!(%status, last_line, "engine failed without a verdict");
            return MatchResult::error(format!("engine {status}: {}", last_line.trim()));
        }
        self.parser.parse(output, ceiling)
    }
}

impl MatchPlayer for ProcessEngine {
    fn play(&mut self, spec: &MatchSpec) -> bench_core::Result<MatchResult> {
        let _guard = MATCH_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let path = self.config_path();
        write_match_config(&path, spec)
            .map_err(|source| bench_core::Error::ConfigWrite { path, source })?;

        let started = Instant::now();
        let result = self.run_game(spec);
        info!(
            player0 = %spec.player0,
            player1 = %spec.player1,
            outcome = %result.outcome,
            ticks = result.ticks,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "game finished"
        );
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Read `pipe` to the end on its own thread and send the text over `tx`
fn capture<R: Read + Send + 'static>(stream: Stream, mut pipe: R, tx: Sender<(Stream, String)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send((stream, String::from_utf8_lossy(&buf).into_owned()));
    });
}

/// Stdout followed by stderr, or `None` if the readers are not done by
/// `deadline`
fn collect_output(rx: &Receiver<(Stream, String)>, readers: usize, deadline: Instant) -> Option<String> {
    let (mut stdout, mut stderr) = (String::new(), String::new());
    for _ in 0..readers {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((Stream::Stdout, text)) => stdout = text,
            Ok((Stream::Stderr, text)) => stderr = text,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    stdout.push_str(&stderr);
    Some(stdout)
}

/// Adds `wait_timeout` to `Child`
trait ChildExt {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>>;
}

impl ChildExt for Child {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
        let start = Instant::now();
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(Some(status));
            }
            if start.elapsed() >= timeout {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod executor_tests;
