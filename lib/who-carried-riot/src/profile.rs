use crate::source::{Account, LeagueEntry, Summoner};
use serde::Serialize;

pub const SOLO_QUEUE: &str = "RANKED_SOLO_5x5";
pub const FLEX_QUEUE: &str = "RANKED_FLEX_SR";
pub const UNRANKED: &str = "UNRANKED";

/// Account, level and ranked standing of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummonerProfile {
    pub game_name: String,
    pub tag_line: String,
    pub level: i64,
    pub profile_icon_id: i32,
    /// `"{tier} {rank}"`, or `UNRANKED`.
    pub tier: String,
    pub league_points: i32,
    pub wins: i32,
    pub losses: i32,
    /// Rounded percentage, 0 without games.
    pub win_rate: u32,
}

impl SummonerProfile {
    /// Ranked standing comes from solo queue, then flex, then nothing.
    pub fn new(account: &Account, summoner: &Summoner, entries: &[LeagueEntry]) -> Self {
        let entry = entries
            .iter()
            .find(|e| e.queue_type == SOLO_QUEUE)
            .or_else(|| entries.iter().find(|e| e.queue_type == FLEX_QUEUE));

        let (tier, league_points, wins, losses) = match entry {
            Some(e) => (format!("{} {}", e.tier, e.rank), e.league_points, e.wins, e.losses),
            None => (UNRANKED.to_string(), 0, 0, 0),
        };

        Self {
            game_name: account.game_name.clone(),
            tag_line: account.tag_line.clone(),
            level: summoner.level,
            profile_icon_id: summoner.profile_icon_id,
            tier,
            league_points,
            wins,
            losses,
            win_rate: win_rate(wins, losses),
        }
    }

    pub fn is_ranked(&self) -> bool {
        self.tier != UNRANKED
    }
}

fn win_rate(wins: i32, losses: i32) -> u32 {
    let games = wins.max(0) + losses.max(0);
    if games == 0 {
        return 0;
    }
    (f64::from(wins.max(0)) / f64::from(games) * 100.0).round() as u32
}
