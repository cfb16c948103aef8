use super::*;
use crate::aggregate::OpponentStats;
use crate::schema::parse_run_record;
use crate::types::{MatchResult, RunConfig};

fn contestant(model: &str, score: f64) -> ContestantRun {
    ContestantRun {
        model: model.to_string(),
        agent: None,
        score,
        eliminated_at: None,
        breakdown: Vec::new(),
        games: Vec::new(),
    }
}

fn run(
    version: SchemaVersion,
    format: LadderFormat,
    date: &str,
    source: &str,
    contestants: Vec<ContestantRun>,
) -> RunRecord {
    RunRecord {
        version,
        format,
        date: date.to_string(),
        config: RunConfig::default(),
        opponents: Vec::new(),
        contestants,
        head_to_head: Vec::new(),
        source_file: source.to_string(),
    }
}

fn h2h(p0: &str, p1: &str, result: MatchResult) -> HeadToHeadGame {
    HeadToHeadGame {
        player0: p0.to_string(),
        player1: p1.to_string(),
        result,
    }
}

#[test]
fn test_higher_score_wins_across_versions() {
    let runs = vec![
        run(SchemaVersion::V1, LadderFormat::Full, "2025-05-01T10:00:00", "benchmark_a.json", vec![contestant("X", 55.0)]),
        run(SchemaVersion::V2, LadderFormat::SingleElimination, "2025-06-01T10:00:00", "tournament_b.json", vec![contestant("X", 62.0)]),
    ];
    let board = merge_runs(&runs);
    let entry = board.entry("X").unwrap();
    assert_eq!(entry.score, 62.0);
    assert_eq!(entry.version, SchemaVersion::V2);
    assert_eq!(entry.format, LadderFormat::SingleElimination);
    assert_eq!(entry.source_file, "tournament_b.json");
}

#[test]
fn test_tie_prefers_newer_version() {
    let runs = vec![
        run(SchemaVersion::V2, LadderFormat::Full, "2025-01-01T00:00:00", "b.json", vec![contestant("X", 40.0)]),
        run(SchemaVersion::V1, LadderFormat::Full, "2025-12-01T00:00:00", "a.json", vec![contestant("X", 40.0)]),
    ];
    assert_eq!(merge_runs(&runs).entry("X").unwrap().source_file, "b.json");
}

#[test]
fn test_tie_prefers_later_timestamp() {
    let runs = vec![
        run(SchemaVersion::V2, LadderFormat::Full, "2025-03-02T08:00:00", "late.json", vec![contestant("X", 40.0)]),
        run(SchemaVersion::V2, LadderFormat::Full, "2025-03-01T08:00:00", "early.json", vec![contestant("X", 40.0)]),
    ];
    assert_eq!(merge_runs(&runs).entry("X").unwrap().source_file, "late.json");
}

#[test]
fn test_merge_is_order_independent() {
    let mut runs = vec![
        run(SchemaVersion::V1, LadderFormat::Full, "2025-05-01T10:00:00", "benchmark_1.json", vec![contestant("X", 55.0), contestant("Y", 10.0)]),
        run(SchemaVersion::V2, LadderFormat::SingleElimination, "2025-06-01T10:00:00", "tournament_2.json", vec![contestant("X", 55.0), contestant("Z", 70.5)]),
        run(SchemaVersion::V2, LadderFormat::SingleElimination, "2025-06-01T10:00:00", "tournament_3.json", vec![contestant("Y", 10.0), contestant("Z", 12.0)]),
    ];
    runs[1].head_to_head.push(h2h("X", "Z", MatchResult::win(900)));
    runs[2].head_to_head.push(h2h("Z", "Y", MatchResult::draw(1500)));

    let expected = merge_runs(&runs).to_json_pretty().unwrap();
    for rotation in 1..runs.len() {
        let mut shuffled = runs.clone();
        shuffled.rotate_left(rotation);
        assert_eq!(merge_runs(&shuffled).to_json_pretty().unwrap(), expected);
        shuffled.reverse();
        assert_eq!(merge_runs(&shuffled).to_json_pretty().unwrap(), expected);
    }

    let board = merge_runs(&runs);
    assert_eq!(board.entry("X").unwrap().source_file, "tournament_2.json");
    assert_eq!(board.entry("Y").unwrap().source_file, "tournament_3.json");
    let ranked: Vec<_> = board.entries.iter().map(|e| (e.rank, e.model.as_str())).collect();
    assert_eq!(ranked, vec![(1, "Z"), (2, "X"), (3, "Y")]);
}

#[test]
fn test_history_is_newest_first() {
    let runs = vec![
        run(SchemaVersion::V1, LadderFormat::Full, "2025-01-01T00:00:00", "a.json", vec![contestant("B", 1.0), contestant("A", 2.0)]),
        run(SchemaVersion::V2, LadderFormat::Full, "2025-02-01T00:00:00", "b.json", vec![contestant("A", 3.0)]),
    ];
    let history = build_history(&runs);
    let order: Vec<_> = history
        .iter()
        .map(|h| (h.source_file.as_str(), h.model.as_str()))
        .collect();
    assert_eq!(order, vec![("b.json", "A"), ("a.json", "A"), ("a.json", "B")]);
}

#[test]
fn test_head_to_head_is_symmetric_and_additive() {
    let mut first = run(SchemaVersion::V1, LadderFormat::Full, "2025-01-01", "a.json", vec![]);
    first.head_to_head = vec![
        h2h("A", "B", MatchResult::win(100)),
        h2h("A", "B", MatchResult::draw(3000)),
        h2h("B", "C", MatchResult::loss(200)),
        h2h("A", "C", MatchResult::timeout(3000)),
        h2h("A", "A", MatchResult::win(10)),
    ];
    let mut second = run(SchemaVersion::V2, LadderFormat::Full, "2025-02-01", "b.json", vec![]);
    second.head_to_head = vec![h2h("B", "A", MatchResult::win(100))];

    let matrix = build_head_to_head(&[first, second]);

    let ab = matrix.get("A", "B").unwrap();
    assert_eq!((ab.wins, ab.losses, ab.draws), (1, 1, 1));
    let ba = matrix.get("B", "A").unwrap();
    assert_eq!((ba.wins, ba.losses, ba.draws), (1, 1, 1));
    assert_eq!(matrix.get("C", "B").unwrap().wins, 1);
    assert!(matrix.get("A", "C").is_none());
    assert!(matrix.get("A", "A").is_none());

    for a in matrix.players() {
        for b in matrix.players() {
            if let (Some(x), Some(y)) = (matrix.get(a, b), matrix.get(b, a)) {
                assert_eq!(x.wins, y.losses);
                assert_eq!(x.draws, y.draws);
            }
        }
    }
}

#[test]
fn test_entries_keep_recorded_breakdown() {
    let mut x = contestant("X", 12.0);
    x.eliminated_at = Some("B".to_string());
    x.breakdown = vec![OpponentLine {
        opponent: "A".to_string(),
        stats: OpponentStats {
            wins: 1,
            ..Default::default()
        },
    }];
    let board = merge_runs(&[run(SchemaVersion::V2, LadderFormat::SingleElimination, "d", "f.json", vec![x])]);
    let entry = board.entry("X").unwrap();
    assert_eq!(entry.grade, Grade::F);
    assert_eq!(entry.eliminated_at.as_deref(), Some("B"));
    assert_eq!(entry.opponents[0].stats.wins, 1);
}

#[test]
fn test_leaderboard_json_shape() {
    let v1 = parse_run_record(
        r#"{ "version": "1.0", "date": "2025-05-01T10:00:00", "benchmark_scores": { "X": 55.0 } }"#,
        "benchmark_old.json",
    )
    .unwrap();
    let board = merge_runs(&[v1]);
    let json = board.to_json_pretty().unwrap();
    assert!(json.contains("\"version\": \"1.0\""));
    assert!(json.contains("\"format\": \"full\""));
    assert!(json.contains("\"grade\": \"D\""));
    assert!(json.contains("\"sources\": [\n    \"benchmark_old.json\"\n  ]"));
    assert!(!json.contains("generated"));
}
