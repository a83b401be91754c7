//! Fetching player and match records from the Riot API.

pub mod error;
pub mod ingest;
pub mod pacing;
pub mod profile;
pub mod riot;
pub mod source;

pub use error::SourceError;
pub use ingest::{Ingestor, PlayerHistory};
pub use pacing::{AnyPacer, FixedDelay, Pacer, PacingPolicy, TokenBucket};
pub use profile::SummonerProfile;
pub use riot::{platform_route, RiotSource};
pub use source::{Account, LeagueEntry, MatchSource, Summoner};
