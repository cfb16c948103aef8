//! Console reports

use bench_core::{Grade, Leaderboard, RunRecord};

use crate::submission::Submission;

const CLEARED: &str = "-- cleared all --";

/// Ranking of one run, best score first
pub fn run_report(record: &RunRecord) -> String {
    let mut ranked: Vec<_> = record.contestants.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.model.cmp(&b.model)));

    let mut report = String::new();
    report.push_str(&format!("=== Tournament Results ({}) ===\n\n", record.format));
    report.push_str(&format!(
        "{:<6}{:<30}{:<10}{:<8}{}\n",
        "Rank", "Team", "Score", "Grade", "Eliminated at"
    ));
    report.push_str(&"-".repeat(70));
    report.push('\n');

    for (rank, c) in ranked.iter().enumerate() {
        report.push_str(&format!(
            "{:<6}{:<30}{:<10.1}{:<8}{}\n",
            rank + 1,
            c.model,
            c.score,
            Grade::from_score(c.score).as_str(),
            c.eliminated_at.as_deref().unwrap_or(CLEARED)
        ));
    }

    for c in &ranked {
        if c.breakdown.is_empty() {
            continue;
        }
        report.push_str(&format!("\n{}:\n", c.model));
        for line in &c.breakdown {
            let weight = record.weight_of(&line.opponent).unwrap_or(0);
            report.push_str(&format!(
                "  {:<20} {:>3}-{:<3}-{:<3} {:>6.1} / {}\n",
                line.opponent,
                line.stats.wins,
                line.stats.losses,
                line.stats.draws,
                line.stats.weighted_points.unwrap_or(0.0),
                weight
            ));
        }
    }

    if !record.head_to_head.is_empty() {
        report.push_str("\nHead-to-head:\n");
        for game in &record.head_to_head {
            report.push_str(&format!(
                "  {:<24} vs {:<24} {}\n",
                game.player0, game.player1, game.result.outcome
            ));
        }
    }
    report
}

pub fn leaderboard_report(board: &Leaderboard) -> String {
    let mut report = String::new();
    report.push_str("=== Leaderboard ===\n\n");
    report.push_str(&format!(
        "{:<6}{:<30}{:<10}{:<8}{:<6}{:<22}{}\n",
        "Rank", "Model", "Score", "Grade", "Ver", "Format", "Eliminated at"
    ));
    report.push_str(&"-".repeat(100));
    report.push('\n');

    for entry in &board.entries {
        report.push_str(&format!(
            "{:<6}{:<30}{:<10.1}{:<8}{:<6}{:<22}{}\n",
            entry.rank,
            entry.model,
            entry.score,
            entry.grade.as_str(),
            entry.version.as_str(),
            entry.format.as_str(),
            entry.eliminated_at.as_deref().unwrap_or("-")
        ));
    }
    report.push_str(&format!(
        "\n{} models from {} run files\n",
        board.entries.len(),
        board.sources.len()
    ));
    report
}

pub fn submissions_report(submissions: &[Submission]) -> String {
    let mut report = String::new();
    report.push_str(&format!("{:<24}{:<30}{:<10}{}\n", "Team", "Display name", "Provider", "Agent"));
    report.push_str(&"-".repeat(100));
    report.push('\n');
    for s in submissions {
        report.push_str(&format!(
            "{:<24}{:<30}{:<10}{}\n",
            s.manifest.team_name,
            s.manifest.display_name,
            s.manifest.model_provider,
            s.agent_id()
        ));
    }
    report
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod summary_tests;
