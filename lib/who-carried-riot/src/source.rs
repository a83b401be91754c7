use crate::error::SourceError;
use who_carried_evaluation::RawMatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summoner {
    pub level: i64,
    pub profile_icon_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueEntry {
    pub queue_type: String,
    pub tier: String,
    pub rank: String,
    pub league_points: i32,
    pub wins: i32,
    pub losses: i32,
}

/// Upstream provider of account, league and match records.
///
/// Every lookup distinguishes "not found" (`Ok(None)` or an empty list) from
/// a failed request (`Err`).
pub trait MatchSource {
    async fn account(&self, game_name: &str, tag_line: &str)
        -> Result<Option<Account>, SourceError>;

    async fn summoner(&self, puuid: &str) -> Result<Option<Summoner>, SourceError>;

    async fn league_entries(&self, puuid: &str) -> Result<Vec<LeagueEntry>, SourceError>;

    /// Most recent match IDs first.
    async fn match_ids(&self, puuid: &str, count: i32) -> Result<Vec<String>, SourceError>;

    async fn match_detail(&self, match_id: &str) -> Result<Option<RawMatch>, SourceError>;
}
