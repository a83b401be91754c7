//! Contribution scoring for League of Legends matches: per-participant scores,
//! per-match analysis, squad rollups and the labels derived from them.
//!
//! Everything in this crate is pure. Fetching data lives in
//! `who-carried-riot`.

pub mod analyzer;
pub mod identity;
pub mod label;
pub mod participant;
pub mod role;
pub mod score;
pub mod squad;
pub mod summary;

pub use analyzer::{AnalyzedMatch, MatchAnalyzer, MatchResult, Recency, SquadMemberPerformance};
pub use identity::Identity;
pub use participant::{ParticipantStat, RawMatch};
pub use score::{Score, ScoreBreakdown, ScoringPolicy};
pub use squad::{aggregate_squad, rank_squad, RankedMember, SquadAggregate, SquadHighlights};
