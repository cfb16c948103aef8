//! Core of the reference-ladder benchmark arena
//!
//! This crate provides the pure parts of the benchmark:
//! - Scoring a single game against a reference opponent
//! - The single-elimination ladder a contestant climbs
//! - Folding ladder results into a 0-100 benchmark score
//! - Reading historical run files of every schema version
//! - Merging runs into a deterministic best-per-model leaderboard
//!
//! Nothing here spawns processes or touches the filesystem; the game engine
//! sits behind the [`MatchPlayer`] trait.

mod aggregate;
mod error;
mod ladder;
mod merge;
mod record;
mod schema;
mod score;
mod types;

pub use aggregate::*;
pub use error::*;
pub use ladder::*;
pub use merge::*;
pub use record::*;
pub use schema::*;
pub use score::*;
pub use types::*;
