use super::*;
use crate::aggregate::opponent_breakdown;
use crate::ladder::OpponentBatch;
use crate::types::{Contestant, Outcome};

const V1_BENCHMARK: &str = r#"{
  "version": "1.0",
  "date": "2025-06-01T10:00:00",
  "config": { "map": "maps/8x8/basesWorkers8x8.xml", "max_cycles": 3000, "games_per_matchup": 2 },
  "benchmark_scores": { "llama3.1:8b": 52.0, "qwen3:4b": 20.0 },
  "detailed_results": {
    "llama3.1:8b": {
      "reference_games": {
        "ai.abstraction.WorkerRush": [
          { "result": "win", "ticks": 2900, "game_num": 1, "opponent": "WorkerRush" },
          { "result": "timeout", "ticks": 3000, "game_num": 2, "opponent": "WorkerRush" }
        ],
        "ai.RandomBiasedAI": [
          { "result": "draw", "ticks": 3000, "game_num": 1, "opponent": "RandomBiasedAI" },
          { "result": "draw", "ticks": 3000, "game_num": 2, "opponent": "RandomBiasedAI" }
        ]
      },
      "llm_games": []
    }
  },
  "head_to_head": [
    { "result": "win", "ticks": 1200, "player0": "llama3.1:8b", "player1": "qwen3:4b" }
  ]
}"#;

const V1_TOURNAMENT: &str = r#"{
  "version": "1.0",
  "format": "single-elimination",
  "date": "2025-07-01T09:30:00",
  "config": { "map": "maps/8x8/basesWorkers8x8.xml", "max_cycles": 1500, "games_per_matchup": 1 },
  "anchors": {
    "ai.abstraction.HeavyRush": { "name": "HeavyRush", "weight": 20, "tier": "medium-hard" },
    "ai.RandomBiasedAI": { "name": "RandomBiasedAI", "weight": 10, "tier": "easy" }
  },
  "results": [
    {
      "team_name": "example-team",
      "display_name": "Example Team",
      "score": 12.0,
      "eliminated_at": "HeavyRush",
      "opponents": {
        "RandomBiasedAI": { "wins": 1, "draws": 0, "losses": 0, "avg_game_score": 1.2, "weighted_points": 12.0 },
        "HeavyRush": { "wins": 0, "draws": 0, "losses": 1, "avg_game_score": 0.0, "weighted_points": 0.0 }
      }
    }
  ],
  "head_to_head": []
}"#;

#[test]
fn test_v1_benchmark_reconstructs_breakdown() {
    let file = VersionedRunFile::from_json(V1_BENCHMARK).unwrap();
    assert_eq!(file.version(), SchemaVersion::V1);
    let record = file.normalize("benchmark_2025-06-01_10-00.json");

    assert_eq!(record.format, LadderFormat::Full);
    assert_eq!(record.config.max_cycles, 3000);
    assert_eq!(record.source_file, "benchmark_2025-06-01_10-00.json");
    assert_eq!(record.weight_of("RandomBiasedAI"), Some(40));
    assert_eq!(record.weight_of("WorkerRush"), Some(60));

    let llama = record.contestant("llama3.1:8b").unwrap();
    // Recorded score is kept even though the games would rescore differently
    assert_eq!(llama.score, 52.0);
    assert_eq!(llama.eliminated_at, None);
    assert_eq!(llama.games.len(), 4);
    assert_eq!(llama.breakdown.len(), 2);
    assert_eq!(llama.breakdown[0].opponent, "RandomBiasedAI");
    assert_eq!(llama.breakdown[0].stats.draws, 2);
    assert_eq!(llama.breakdown[1].opponent, "WorkerRush");
    assert_eq!((llama.breakdown[1].stats.wins, llama.breakdown[1].stats.losses), (1, 1));
    assert!(llama.breakdown[1].stats.weighted_points.is_none());

    // No detail stored for this one: entry survives with an empty breakdown
    let qwen = record.contestant("qwen3:4b").unwrap();
    assert_eq!(qwen.score, 20.0);
    assert!(qwen.breakdown.is_empty());

    assert_eq!(record.head_to_head.len(), 1);
    assert_eq!(record.head_to_head[0].result.outcome, Outcome::Win);
}

#[test]
fn test_v1_tournament_results() {
    let record = parse_run_record(V1_TOURNAMENT, "tournament_2025-07-01_09-30.json").unwrap();

    assert_eq!(record.version, SchemaVersion::V1);
    assert_eq!(record.format, LadderFormat::SingleElimination);
    assert_eq!(record.opponents.len(), 2);
    assert_eq!(record.opponents[0].name, "RandomBiasedAI");
    assert_eq!(record.opponents[1].name, "HeavyRush");

    let team = record.contestant("Example Team").unwrap();
    assert_eq!(team.score, 12.0);
    assert_eq!(team.eliminated_at.as_deref(), Some("HeavyRush"));
    assert_eq!(team.breakdown[0].opponent, "RandomBiasedAI");
    assert_eq!(team.breakdown[0].stats.weighted_points, Some(12.0));
    assert!(team.games.is_empty());
}

#[test]
fn test_unknown_v1_anchor_gets_zero_weight() {
    let text = r#"{
      "benchmark_scores": { "m": 1.0 },
      "detailed_results": { "m": { "reference_games": {
        "ai.custom.Mystery": [ { "result": "lost-connection", "ticks": 5 } ]
      } } }
    }"#;
    let record = parse_run_record(text, "benchmark_x.json").unwrap();
    assert_eq!(record.version, SchemaVersion::V1);
    assert_eq!(record.weight_of("Mystery"), Some(0));

    let m = record.contestant("m").unwrap();
    assert_eq!(m.games[0].result.outcome, Outcome::Error);
    assert_eq!(m.games[0].game_num, 1);
    assert_eq!(m.breakdown[0].opponent, "Mystery");
    assert_eq!(m.breakdown[0].stats.losses, 1);
}

#[test]
fn test_missing_fields_degrade() {
    let record = parse_run_record(r#"{ "version": "2.0", "benchmark_scores": { "m": 33.5 } }"#, "f.json").unwrap();
    assert_eq!(record.date, "");
    assert_eq!(record.config.games_per_matchup, 1);
    assert_eq!(record.contestants.len(), 1);
    assert_eq!(record.contestants[0].score, 33.5);
    assert!(record.contestants[0].breakdown.is_empty());
}

#[test]
fn test_unsupported_version() {
    assert!(matches!(
        VersionedRunFile::from_json(r#"{ "version": "3.1" }"#),
        Err(Error::UnsupportedVersion(v)) if v == "3.1"
    ));
    assert!(matches!(VersionedRunFile::from_json("not json"), Err(Error::Json(_))));
}

#[test]
fn test_v2_document_normalizes_back() {
    let opponents = OpponentSet::new(vec![
        Opponent::new("A", "ai.A", 10, "easy"),
        Opponent::new("B", "ai.B", 20, "medium"),
    ])
    .unwrap();
    let contestant = Contestant::new("X", "ai.submissions.x.Agent");
    let batches = vec![
        OpponentBatch {
            opponent: "A".to_string(),
            games: vec![GameRecord {
                contestant: "X".to_string(),
                opponent: "A".to_string(),
                game_num: 1,
                result: MatchResult::win(400),
            }],
        },
        OpponentBatch {
            opponent: "B".to_string(),
            games: vec![GameRecord {
                contestant: "X".to_string(),
                opponent: "B".to_string(),
                game_num: 1,
                result: MatchResult::error("engine crashed"),
            }],
        },
    ];
    let record = RunRecord {
        version: SchemaVersion::V2,
        format: LadderFormat::SingleElimination,
        date: "2025-08-01T12:00:00".to_string(),
        config: RunConfig {
            map: "maps/8x8/basesWorkers8x8.xml".to_string(),
            max_cycles: 1500,
            games_per_matchup: 1,
        },
        opponents: opponents.as_slice().to_vec(),
        contestants: vec![ContestantRun {
            model: contestant.name.clone(),
            agent: Some(contestant.agent.clone()),
            score: 12.0,
            eliminated_at: Some("B".to_string()),
            breakdown: opponent_breakdown(&batches, &opponents, 1500),
            games: batches.iter().flat_map(|b| b.games.clone()).collect(),
        }],
        head_to_head: Vec::new(),
        source_file: String::new(),
    };

    let json = RunFileV2::from_record(&record).to_json_pretty().unwrap();
    assert!(json.contains("\"version\": \"2.0\""));
    assert!(json.contains("\"format\": \"single-elimination\""));
    assert!(json.contains("\"error\": \"engine crashed\""));

    let back = parse_run_record(&json, "tournament_a.json").unwrap();
    assert_eq!(back.source_file, "tournament_a.json");
    assert_eq!(RunRecord { source_file: String::new(), ..back }, record);
}
