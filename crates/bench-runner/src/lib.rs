//! Benchmark runner for the reference ladder
//!
//! This crate connects the pure benchmark core to the outside world:
//! - Launching the external game engine, one match at a time
//! - Turning its free-form output into a match verdict
//! - Loading arena settings and contestant submissions
//! - Running ladders and persisting run records
//! - Regenerating the leaderboard from every historical run file
//!
//! # Usage
//!
//! ```bash
//! # Run every submission up the ladder
//! arena run --config arena.toml --games 2
//!
//! # Rebuild the leaderboard from all run files
//! arena leaderboard --results-dir tournament_results --extra-dir benchmark_results
//! ```

mod error;
mod executor;
mod game_config;
mod orchestrator;
mod settings;
mod store;
mod submission;
mod summary;
mod verdict;

pub use error::*;
pub use executor::*;
pub use game_config::*;
pub use orchestrator::*;
pub use settings::*;
pub use store::*;
pub use submission::*;
pub use summary::*;
pub use verdict::*;
