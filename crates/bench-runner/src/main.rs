//! Arena CLI
//!
//! Run submissions up the reference ladder and maintain the leaderboard.

use anyhow::{bail, Context, Result};
use bench_core::{merge_runs, LadderFormat};
use bench_runner::{
    leaderboard_report, load_all, load_all_runs, run_report, submissions_report, ArenaSettings,
    Orchestrator, ProcessEngine, RunStore,
};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arena", about = "Reference-ladder benchmark arena", version)]
struct Cli {
    /// Settings file; defaults are used when it does not exist
    #[arg(long, global = true, value_name = "FILE", default_value = "arena.toml")]
    config: PathBuf,
    /// Debug logging unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every submission up the ladder and save the run
    Run(RunArgs),
    /// Rebuild the leaderboard from all run files
    Leaderboard(LeaderboardArgs),
    /// List valid submissions
    Submissions(SubmissionsArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Games per opponent
    #[arg(long, value_name = "N")]
    games: Option<u32>,
    /// Skip the head-to-head round
    #[arg(long)]
    skip_h2h: bool,
    /// Ladder format: single-elimination or full
    #[arg(long, value_name = "FORMAT")]
    format: Option<LadderFormat>,
    #[arg(long, value_name = "DIR")]
    submissions_dir: Option<PathBuf>,
    #[arg(long, value_name = "DIR")]
    results_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LeaderboardArgs {
    /// Where run files are read and leaderboard.json is written
    #[arg(long, value_name = "DIR")]
    results_dir: Option<PathBuf>,
    /// More directories with run files, e.g. older benchmark results
    #[arg(long = "extra-dir", value_name = "DIR")]
    extra_dirs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct SubmissionsArgs {
    #[arg(long, value_name = "DIR")]
    submissions_dir: Option<PathBuf>,
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run(mut settings: ArenaSettings, args: RunArgs) -> Result<()> {
    if let Some(games) = args.games {
        settings.games_per_matchup = games;
    }
    if let Some(format) = args.format {
        settings.format = format;
    }
    if args.skip_h2h {
        settings.head_to_head = false;
    }
    if let Some(dir) = args.submissions_dir {
        settings.submissions_dir = dir;
    }
    if let Some(dir) = args.results_dir {
        settings.results_dir = dir;
    }

    let submissions = load_all(&settings.submissions_dir)
        .with_context(|| format!("reading submissions from {}", settings.submissions_dir.display()))?;
    if submissions.is_empty() {
        bail!("no valid submissions in {}", settings.submissions_dir.display());
    }
    let contestants: Vec<_> = submissions.iter().map(|s| s.contestant()).collect();

    let engine = ProcessEngine::new(&settings.engine)?;
    let mut orchestrator = Orchestrator::from_settings(engine, &settings)?;

    println!("=== Tournament ({}) ===", settings.format);
    println!(
        "Contestants: {}, games per opponent: {}",
        contestants.len(),
        settings.games_per_matchup
    );
    for (i, opponent) in orchestrator.opponents().iter().enumerate() {
        println!("  {}. {} ({}): {} pts max", i + 1, opponent.name, opponent.tier, opponent.weight);
    }
    println!();

    let started = Local::now().naive_local();
    let record = orchestrator.run(&contestants, &started)?;
    print!("{}", run_report(&record));

    let store = RunStore::new(&settings.results_dir).with_prefix(&settings.run_prefix);
    let path = store
        .write_run(&record, &settings.run_prefix, &started)
        .context("saving run")?;
    println!("\nResults saved to {}", path.display());

    let runs = store.load_runs()?;
    store.write_leaderboard(&merge_runs(&runs))?;
    Ok(())
}

fn leaderboard(settings: ArenaSettings, args: LeaderboardArgs) -> Result<()> {
    let results_dir = args.results_dir.unwrap_or(settings.results_dir);
    let primary = RunStore::new(&results_dir).with_prefix(&settings.run_prefix);
    let mut stores = vec![primary.clone()];
    stores.extend(
        args.extra_dirs
            .iter()
            .map(|dir| RunStore::new(dir).with_prefix(&settings.run_prefix)),
    );

    let runs = load_all_runs(&stores)?;
    if runs.is_empty() {
        warn!(dir = %results_dir.display(), "no run files found");
    }
    let board = merge_runs(&runs);
    let path = primary.write_leaderboard(&board)?;
    print!("{}", leaderboard_report(&board));
    info!(path = %path.display(), "leaderboard written");
    Ok(())
}

fn submissions(settings: ArenaSettings, args: SubmissionsArgs) -> Result<()> {
    let dir = args.submissions_dir.unwrap_or(settings.submissions_dir);
    let found = load_all(&dir).with_context(|| format!("reading submissions from {}", dir.display()))?;
    print!("{}", submissions_report(&found));
    println!("\n{} valid submissions", found.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let settings = ArenaSettings::load(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    match cli.command {
        Commands::Run(args) => run(settings, args),
        Commands::Leaderboard(args) => leaderboard(settings, args),
        Commands::Submissions(args) => submissions(settings, args),
    }
}
