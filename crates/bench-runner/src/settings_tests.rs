use super::*;
use std::io::Write;

#[test]
fn test_defaults_match_standard_ladder() {
    let settings = ArenaSettings::default();
    assert_eq!(settings.format, LadderFormat::SingleElimination);
    assert_eq!(settings.max_cycles, 1500);
    assert_eq!(settings.engine.timeout(), Duration::from_secs(900));
    assert_eq!(settings.engine.command.last().map(String::as_str), Some("rts.MicroRTS"));

    let set = settings.opponent_set().unwrap();
    assert_eq!(set, OpponentSet::standard());
    assert_eq!(set.total_weight(), 100);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ArenaSettings::load(&dir.path().join("arena.toml")).unwrap();
    assert_eq!(settings, ArenaSettings::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
games_per_matchup = 3
format = "full"
head_to_head = false

[engine]
command = ["./engine.sh"]
timeout_secs = 5

[engine.env]
OLLAMA_HOST = "http://localhost:11434"

[[opponents]]
name = "RandomBiasedAI"
agent = "ai.RandomBiasedAI"
weight = 40
tier = "easy"

[[opponents]]
name = "WorkerRush"
agent = "ai.abstraction.WorkerRush"
weight = 60
"#
    )
    .unwrap();

    let settings = ArenaSettings::load(file.path()).unwrap();
    assert_eq!(settings.games_per_matchup, 3);
    assert_eq!(settings.format, LadderFormat::Full);
    assert!(!settings.head_to_head);
    assert_eq!(settings.engine.command, vec!["./engine.sh".to_string()]);
    assert_eq!(settings.engine.config_file, PathBuf::from("resources/config.properties"));
    assert_eq!(settings.engine.env["OLLAMA_HOST"], "http://localhost:11434");
    assert_eq!(settings.results_dir, PathBuf::from("tournament_results"));

    let set = settings.opponent_set().unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.get(1).unwrap().tier, "");

    let ladder = settings.ladder_config();
    assert_eq!(ladder.games_per_matchup, 3);
    assert_eq!(settings.run_config().map, "maps/8x8/basesWorkers8x8.xml");
}

#[test]
fn test_invalid_toml_is_reported_with_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_cycles = \"lots\"").unwrap();
    match ArenaSettings::load(file.path()) {
        Err(RunnerError::Settings { path, .. }) => assert_eq!(path, file.path()),
        other => panic!("expected settings error, got {other:?}"),
    }
}

#[test]
fn test_unknown_format_rejected() {
    assert!(ArenaSettings::from_toml(r#"format = "round-robin""#).is_err());
}

#[test]
fn test_bad_opponents_rejected() {
    let settings = ArenaSettings {
        opponents: vec![
            Opponent::new("A", "ai.A", 50, ""),
            Opponent::new("A", "ai.A", 50, ""),
        ],
        ..ArenaSettings::default()
    };
    assert!(matches!(
        settings.opponent_set(),
        Err(RunnerError::Core(bench_core::Error::DuplicateOpponent(_)))
    ));

    let empty = ArenaSettings {
        opponents: Vec::new(),
        ..ArenaSettings::default()
    };
    assert!(empty.opponent_set().is_err());
}
