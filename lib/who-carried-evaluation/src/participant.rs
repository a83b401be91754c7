use crate::identity::Identity;
use crate::role::Position;
use serde::{Deserialize, Serialize};

/// One participant's statistics in one match, as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ParticipantStat {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    pub champion_name: String,
    pub position: Position,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub total_damage_dealt_to_champions: u32,
    pub total_damage_taken: u32,
    pub gold_earned: u32,
    pub vision_score: u32,
    pub win: bool,
}

impl ParticipantStat {
    pub fn identity(&self) -> Identity {
        Identity::new(&self.game_name, &self.tag_line)
    }
}

/// A fetched match before any analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatch {
    pub match_id: String,
    pub queue_id: u16,
    /// Milliseconds since the Unix epoch.
    pub game_end_timestamp: i64,
    pub participants: Vec<ParticipantStat>,
}
