//! The key=value configuration file the game engine reads at startup

use bench_core::MatchSpec;
use std::io::ErrorKind;
use std::path::Path;

pub const KEY_PLAYER0: &str = "AI1";
pub const KEY_PLAYER1: &str = "AI2";
pub const KEY_MAX_CYCLES: &str = "max_cycles";
pub const KEY_HEADLESS: &str = "headless";

/// Apply a match to the existing file contents.
///
/// Every line setting a match key is rewritten, repeated keys included, since
/// the engine keeps the last one it reads. Other lines, comments and blank
/// lines are kept as is; a match key missing from the file is appended.
pub fn render_match_config(existing: &str, spec: &MatchSpec) -> String {
    let max_cycles = spec.max_cycles.to_string();
    let keys: [(&str, &str); 4] = [
        (KEY_PLAYER0, spec.player0.as_str()),
        (KEY_PLAYER1, spec.player1.as_str()),
        (KEY_MAX_CYCLES, max_cycles.as_str()),
        (KEY_HEADLESS, "true"),
    ];
    let mut seen = [false; 4];

    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            let key = match line.split_once('=') {
                Some((key, _)) if !line.starts_with('#') && !line.starts_with('!') => key.trim(),
                _ => return line.to_string(),
            };
            match keys.iter().position(|(k, _)| *k == key) {
                Some(i) => {
                    seen[i] = true;
                    let (k, v) = keys[i];
                    format!("{k}={v}")
                }
                None => line.to_string(),
            }
        })
        .collect();
    lines.extend(
        keys.iter()
            .zip(seen)
            .filter(|(_, seen)| !seen)
            .map(|((k, v), _)| format!("{k}={v}")),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Rewrite the match keys of the configuration file at `path`.
///
/// A missing file is created with just the match keys.
pub fn write_match_config(path: &Path, spec: &MatchSpec) -> std::io::Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };
    std::fs::write(path, render_match_config(&existing, spec))
}

#[cfg(test)]
#[path = "game_config_tests.rs"]
mod game_config_tests;
