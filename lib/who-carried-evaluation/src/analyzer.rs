use crate::identity::Identity;
use crate::label::{match_tags, Tag};
use crate::participant::{ParticipantStat, RawMatch};
use crate::role::Role;
use crate::score::{ScoreBreakdown, ScoringPolicy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;
use tracing::{debug, warn};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchResult {
    Win,
    Lose,
}

impl Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::Win => f.write_str("WIN"),
            MatchResult::Lose => f.write_str("LOSE"),
        }
    }
}

/// How long ago a match ended. Under 24 hours is counted in whole hours,
/// anything older in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recency {
    Hours(i64),
    Days(i64),
}

impl Recency {
    pub fn between(game_end_timestamp: i64, now: DateTime<Utc>) -> Self {
        // Clock skew can put the end slightly in the future
        let hours = (now.timestamp_millis() - game_end_timestamp).max(0) / MILLIS_PER_HOUR;
        if hours < 24 {
            Recency::Hours(hours)
        } else {
            Recency::Days(hours / 24)
        }
    }
}

impl Display for Recency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recency::Hours(hours) => write!(f, "{hours}시간 전"),
            Recency::Days(days) => write!(f, "{days}일 전"),
        }
    }
}

/// Derived performance of one participant in one match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadMemberPerformance {
    pub identity: Identity,
    pub puuid: String,
    pub champion_name: String,
    pub role: Role,
    pub score: i32,
    pub breakdown: ScoreBreakdown,
    pub kda_ratio: f64,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub damage: u32,
    pub gold: u32,
    pub vision_score: u32,
    pub win: bool,
    /// Threshold tags earned in this match.
    pub tags: Vec<Tag>,
}

impl SquadMemberPerformance {
    pub fn kda(&self) -> String {
        format!("{}/{}/{}", self.kills, self.deaths, self.assists)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedMatch {
    pub match_id: String,
    pub queue_id: u16,
    pub recency: Recency,
    pub result: MatchResult,
    pub target: SquadMemberPerformance,
    pub participants: Vec<SquadMemberPerformance>,
}

impl AnalyzedMatch {
    /// Whether every identity in `identities` played in this match.
    pub fn contains_all(&self, identities: &HashSet<&Identity>) -> bool {
        let present: HashSet<&Identity> = self.participants.iter().map(|p| &p.identity).collect();
        identities.iter().all(|identity| present.contains(identity))
    }

    /// Participants whose identity is in `identities`, in match order.
    pub fn members_of<'a>(
        &'a self,
        identities: &'a HashSet<&'a Identity>,
    ) -> impl Iterator<Item = &'a SquadMemberPerformance> + 'a {
        self.participants
            .iter()
            .filter(|p| identities.contains(&p.identity))
    }

    /// The target's own team (same result), target first.
    pub fn team_of_target(&self) -> Vec<Identity> {
        let mut team = vec![self.target.identity.clone()];
        team.extend(
            self.participants
                .iter()
                .filter(|p| p.win == self.target.win && p.puuid != self.target.puuid)
                .map(|p| p.identity.clone()),
        );
        team
    }

    /// Participants on the winning side, then the losing side, each in
    /// match order.
    pub fn roster(&self) -> (Vec<&SquadMemberPerformance>, Vec<&SquadMemberPerformance>) {
        self.participants.iter().partition(|p| p.win)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchAnalyzer {
    scoring: ScoringPolicy,
}

impl MatchAnalyzer {
    pub fn new(scoring: ScoringPolicy) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &ScoringPolicy {
        &self.scoring
    }

    pub fn performance(&self, stat: &ParticipantStat) -> SquadMemberPerformance {
        let score = self.scoring.score(stat);
        let mut performance = SquadMemberPerformance {
            identity: stat.identity(),
            puuid: stat.puuid.clone(),
            champion_name: stat.champion_name.clone(),
            role: Role::displayed(stat.position),
            score: score.value,
            breakdown: score.breakdown,
            kda_ratio: score.kda_ratio,
            kills: stat.kills,
            deaths: stat.deaths,
            assists: stat.assists,
            damage: stat.total_damage_dealt_to_champions,
            gold: stat.gold_earned,
            vision_score: stat.vision_score,
            win: stat.win,
            tags: Vec::new(),
        };
        performance.tags = match_tags(&performance);
        performance
    }

    /// Analyze one match from the point of view of `target_puuid`. Returns
    /// [`None`] when the target is not among the participants.
    pub fn analyze(
        &self,
        raw: &RawMatch,
        target_puuid: &str,
        now: DateTime<Utc>,
    ) -> Option<AnalyzedMatch> {
        let participants: Vec<SquadMemberPerformance> = raw
            .participants
            .iter()
            .map(|stat| self.performance(stat))
            .collect();

        let Some(target) = participants.iter().find(|p| p.puuid == target_puuid).cloned() else {
            warn!(
                "Target participant missing from match {}, skipping",
                raw.match_id
            );
            return None;
        };

        Some(AnalyzedMatch {
            match_id: raw.match_id.clone(),
            queue_id: raw.queue_id,
            recency: Recency::between(raw.game_end_timestamp, now),
            result: if target.win {
                MatchResult::Win
            } else {
                MatchResult::Lose
            },
            target,
            participants,
        })
    }

    /// Analyze a batch, dropping matches that cannot be analyzed.
    pub fn analyze_all(
        &self,
        raws: &[RawMatch],
        target_puuid: &str,
        now: DateTime<Utc>,
    ) -> Vec<AnalyzedMatch> {
        let analyzed: Vec<AnalyzedMatch> = raws
            .iter()
            .filter_map(|raw| self.analyze(raw, target_puuid, now))
            .collect();
        debug!("Analyzed {} of {} matches", analyzed.len(), raws.len());
        analyzed
    }
}
