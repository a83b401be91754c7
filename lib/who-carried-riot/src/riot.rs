use crate::error::SourceError;
use crate::source::{Account, LeagueEntry, MatchSource, Summoner};
use riven::consts::{PlatformRoute, RegionalRoute};
use riven::{RiotApi, RiotApiError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use who_carried_evaluation::participant::{ParticipantStat, RawMatch};
use who_carried_evaluation::role::Position;

const ACCOUNT: &str = "account-v1.getByRiotId";
const SUMMONER: &str = "summoner-v4.getByPUUID";
const LEAGUE: &str = "league-v4.getLeagueEntriesByPUUID";
const MATCH_IDS: &str = "match-v5.getMatchIdsByPUUID";
const MATCH: &str = "match-v5.getMatch";

/// Look up a platform route by its (case-insensitive) name, e.g. `kr` or `euw1`.
pub fn platform_route(name: &str) -> Option<PlatformRoute> {
    let route = match name.trim().to_uppercase().as_str() {
        "BR1" => PlatformRoute::BR1,
        "EUN1" => PlatformRoute::EUN1,
        "EUW1" => PlatformRoute::EUW1,
        "JP1" => PlatformRoute::JP1,
        "KR" => PlatformRoute::KR,
        "LA1" => PlatformRoute::LA1,
        "LA2" => PlatformRoute::LA2,
        "NA1" => PlatformRoute::NA1,
        "OC1" => PlatformRoute::OC1,
        "TR1" => PlatformRoute::TR1,
        "RU" => PlatformRoute::RU,
        _ => return None,
    };
    Some(route)
}

/// [`MatchSource`] backed by the Riot API through [`riven`].
///
/// Summoner and league lookups go to the platform route, account and match
/// lookups to the matching regional route.
pub struct RiotSource {
    riot_api: Arc<RiotApi>,
    platform: PlatformRoute,
    region: RegionalRoute,
}

impl std::fmt::Debug for RiotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiotSource")
            .field("platform", &self.platform)
            .field("region", &self.region)
            .finish()
    }
}

impl RiotSource {
    pub fn new(riot_api: Arc<RiotApi>, platform: PlatformRoute) -> Self {
        Self {
            riot_api,
            platform,
            region: platform.to_regional(),
        }
    }
}

impl MatchSource for RiotSource {
    async fn account(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<Account>, SourceError> {
        debug!("Requesting {ACCOUNT} for {game_name}#{tag_line}");
        let response = self
            .riot_api
            .account_v1()
            .get_by_riot_id(self.region, game_name, tag_line)
            .await;
        let Some(account) = not_found_as_none(ACCOUNT, response)?.flatten() else {
            return Ok(None);
        };
        let wire: AccountWire = rewire(ACCOUNT, &account)?;
        Ok(Some(Account {
            puuid: wire.puuid,
            game_name: wire.game_name.unwrap_or_else(|| game_name.to_string()),
            tag_line: wire.tag_line.unwrap_or_else(|| tag_line.to_string()),
        }))
    }

    async fn summoner(&self, puuid: &str) -> Result<Option<Summoner>, SourceError> {
        debug!("Requesting {SUMMONER} for {puuid}");
        let response = self
            .riot_api
            .summoner_v4()
            .get_by_puuid(self.platform, puuid)
            .await;
        let Some(summoner) = not_found_as_none(SUMMONER, response)? else {
            return Ok(None);
        };
        let wire: SummonerWire = rewire(SUMMONER, &summoner)?;
        Ok(Some(Summoner {
            level: wire.summoner_level,
            profile_icon_id: wire.profile_icon_id,
        }))
    }

    async fn league_entries(&self, puuid: &str) -> Result<Vec<LeagueEntry>, SourceError> {
        debug!("Requesting {LEAGUE} for {puuid}");
        let response = self
            .riot_api
            .league_v4()
            .get_league_entries_by_puuid(self.platform, puuid)
            .await;
        let entries = not_found_as_none(LEAGUE, response)?.unwrap_or_default();
        let wire: Vec<LeagueEntryWire> = rewire(LEAGUE, &entries)?;
        Ok(wire.into_iter().map(LeagueEntry::from).collect())
    }

    async fn match_ids(&self, puuid: &str, count: i32) -> Result<Vec<String>, SourceError> {
        debug!("Requesting {MATCH_IDS} for {puuid} (count {count})");
        let response = self
            .riot_api
            .match_v5()
            .get_match_ids_by_puuid(self.region, puuid, Some(count), None, None, None, None, None)
            .await;
        Ok(not_found_as_none(MATCH_IDS, response)?.unwrap_or_default())
    }

    async fn match_detail(&self, match_id: &str) -> Result<Option<RawMatch>, SourceError> {
        debug!("Requesting {MATCH} for {match_id}");
        let response = self
            .riot_api
            .match_v5()
            .get_match(self.region, match_id)
            .await;
        let Some(match_data) = not_found_as_none(MATCH, response)?.flatten() else {
            return Ok(None);
        };
        let wire: MatchWire = rewire(MATCH, &match_data)?;
        Ok(Some(wire.into()))
    }
}

/// 404 becomes `None`, 429 becomes [`SourceError::RateLimited`], everything
/// else is a transport failure.
fn not_found_as_none<T>(
    endpoint: &'static str,
    response: Result<T, RiotApiError>,
) -> Result<Option<T>, SourceError> {
    match response {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let status = e.status_code().map(|status| status.as_u16());
            match status {
                Some(404) => Ok(None),
                Some(429) => Err(SourceError::RateLimited { endpoint }),
                _ => Err(SourceError::Transport {
                    endpoint,
                    status,
                    message: e.to_string(),
                }),
            }
        }
    }
}

/// Re-read a riven model through its JSON form into one of the narrower wire
/// records below.
fn rewire<T: Serialize, U: DeserializeOwned>(
    endpoint: &'static str,
    value: &T,
) -> Result<U, SourceError> {
    serde_json::to_value(value)
        .and_then(serde_json::from_value)
        .map_err(|source| SourceError::Malformed { endpoint, source })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountWire {
    puuid: String,
    game_name: Option<String>,
    tag_line: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummonerWire {
    #[serde(default)]
    summoner_level: i64,
    #[serde(default)]
    profile_icon_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeagueEntryWire {
    queue_type: Option<String>,
    tier: Option<String>,
    rank: Option<String>,
    #[serde(default)]
    league_points: i32,
    #[serde(default)]
    wins: i32,
    #[serde(default)]
    losses: i32,
}

impl From<LeagueEntryWire> for LeagueEntry {
    fn from(wire: LeagueEntryWire) -> Self {
        LeagueEntry {
            queue_type: wire.queue_type.unwrap_or_default(),
            tier: wire.tier.unwrap_or_default(),
            rank: wire.rank.unwrap_or_default(),
            league_points: wire.league_points,
            wins: wire.wins,
            losses: wire.losses,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MatchWire {
    metadata: MetadataWire,
    info: InfoWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataWire {
    match_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InfoWire {
    queue_id: u16,
    #[serde(default)]
    game_start_timestamp: i64,
    game_end_timestamp: Option<i64>,
    participants: Vec<ParticipantWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantWire {
    puuid: String,
    riot_id_game_name: Option<String>,
    riot_id_tagline: Option<String>,
    #[serde(default)]
    champion_name: String,
    team_position: Option<String>,
    #[serde(default)]
    kills: i64,
    #[serde(default)]
    deaths: i64,
    #[serde(default)]
    assists: i64,
    #[serde(default)]
    total_damage_dealt_to_champions: i64,
    #[serde(default)]
    total_damage_taken: i64,
    #[serde(default)]
    gold_earned: i64,
    #[serde(default)]
    vision_score: i64,
    #[serde(default)]
    win: bool,
}

// Riot occasionally reports negative counters (e.g. vision in remakes)
fn counter(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl From<ParticipantWire> for ParticipantStat {
    fn from(wire: ParticipantWire) -> Self {
        ParticipantStat {
            puuid: wire.puuid,
            game_name: wire.riot_id_game_name.unwrap_or_default(),
            tag_line: wire.riot_id_tagline.unwrap_or_default(),
            champion_name: wire.champion_name,
            position: wire
                .team_position
                .as_deref()
                .map(Position::from)
                .unwrap_or_default(),
            kills: counter(wire.kills),
            deaths: counter(wire.deaths),
            assists: counter(wire.assists),
            total_damage_dealt_to_champions: counter(wire.total_damage_dealt_to_champions),
            total_damage_taken: counter(wire.total_damage_taken),
            gold_earned: counter(wire.gold_earned),
            vision_score: counter(wire.vision_score),
            win: wire.win,
        }
    }
}

impl From<MatchWire> for RawMatch {
    fn from(wire: MatchWire) -> Self {
        RawMatch {
            match_id: wire.metadata.match_id,
            queue_id: wire.info.queue_id,
            game_end_timestamp: wire
                .info
                .game_end_timestamp
                .unwrap_or(wire.info.game_start_timestamp),
            participants: wire
                .info
                .participants
                .into_iter()
                .map(ParticipantStat::from)
                .collect(),
        }
    }
}
