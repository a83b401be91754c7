use crate::analyzer::{AnalyzedMatch, MatchResult};
use crate::label::ScoreTier;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Game-mode filter over analyzed matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueFilter {
    #[default]
    All,
    SoloDuo,
    Flex,
    Aram,
    Normal,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown queue filter {0:?}, expected one of all, solo, flex, aram, normal or a queue id")]
pub struct QueueFilterParseError(String);

impl QueueFilter {
    pub fn queue_id(&self) -> Option<u16> {
        match self {
            QueueFilter::All => None,
            QueueFilter::SoloDuo => Some(420),
            QueueFilter::Flex => Some(440),
            QueueFilter::Aram => Some(450),
            QueueFilter::Normal => Some(430),
        }
    }

    /// The named filter for a queue id, if there is one.
    pub fn of_queue(queue_id: u16) -> Option<Self> {
        [
            QueueFilter::SoloDuo,
            QueueFilter::Flex,
            QueueFilter::Aram,
            QueueFilter::Normal,
        ]
        .into_iter()
        .find(|filter| filter.queue_id() == Some(queue_id))
    }

    pub fn matches(&self, queue_id: u16) -> bool {
        self.queue_id().map_or(true, |id| id == queue_id)
    }

    pub fn apply<'a>(&self, matches: &'a [AnalyzedMatch]) -> Vec<&'a AnalyzedMatch> {
        matches.iter().filter(|m| self.matches(m.queue_id)).collect()
    }
}

impl FromStr for QueueFilter {
    type Err = QueueFilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(QueueFilter::All),
            "solo" | "420" => Ok(QueueFilter::SoloDuo),
            "flex" | "440" => Ok(QueueFilter::Flex),
            "aram" | "450" => Ok(QueueFilter::Aram),
            "normal" | "430" => Ok(QueueFilter::Normal),
            _ => Err(QueueFilterParseError(s.to_string())),
        }
    }
}

impl Display for QueueFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            QueueFilter::All => "전체",
            QueueFilter::SoloDuo => "솔랭",
            QueueFilter::Flex => "자랭",
            QueueFilter::Aram => "칼바람",
            QueueFilter::Normal => "일반",
        })
    }
}

/// Letter grade for one averaged stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatGrade {
    #[serde(rename = "S+")]
    SPlus,
    S,
    A,
}

impl Display for StatGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StatGrade::SPlus => "S+",
            StatGrade::S => "S",
            StatGrade::A => "A",
        })
    }
}

/// Grades for fighting, vision control and survival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatGrades {
    pub combat: StatGrade,
    pub vision: StatGrade,
    pub survival: StatGrade,
}

impl StatGrades {
    pub fn new(avg_dmg: i64, avg_vision: f64, avg_deaths: f64) -> Self {
        let grade = |passed: bool, top: StatGrade| if passed { top } else { StatGrade::A };
        Self {
            combat: grade(avg_dmg > 25_000, StatGrade::SPlus),
            vision: grade(avg_vision > 30.0, StatGrade::S),
            survival: grade(avg_deaths < 4.0, StatGrade::S),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChampionStat {
    pub champion_name: String,
    pub games: u32,
    pub wins: u32,
    /// Rounded percentage.
    pub win_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub label: &'static str,
    pub count: u32,
}

/// Overview of one player's (filtered) match history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub match_count: usize,
    pub avg_score: i64,
    pub tier: ScoreTier,
    pub avg_kda_ratio: f64,
    pub avg_dmg: i64,
    pub avg_vision: f64,
    pub avg_deaths: f64,
    pub grades: StatGrades,
    pub champions: Vec<ChampionStat>,
    pub tag_counts: Vec<TagCount>,
}

fn win_rate(wins: u32, games: u32) -> u32 {
    if games == 0 {
        return 0;
    }
    (f64::from(wins) / f64::from(games) * 100.0).round() as u32
}

impl HistorySummary {
    pub fn build(matches: &[&AnalyzedMatch]) -> Self {
        let count = matches.len();
        let divisor = count.max(1) as f64;
        let sum = |f: fn(&AnalyzedMatch) -> f64| matches.iter().map(|m| f(m)).sum::<f64>();

        let total_score: i64 = matches.iter().map(|m| i64::from(m.target.score)).sum();
        let avg_score = if count == 0 {
            0
        } else {
            total_score.div_euclid(count as i64)
        };

        let avg_dmg = (sum(|m| f64::from(m.target.damage)) / divisor).floor() as i64;
        let avg_vision = sum(|m| f64::from(m.target.vision_score)) / divisor;
        let avg_deaths = sum(|m| f64::from(m.target.deaths)) / divisor;

        Self {
            match_count: count,
            avg_score,
            tier: ScoreTier::from_score(avg_score),
            avg_kda_ratio: sum(|m| m.target.kda_ratio) / divisor,
            avg_dmg,
            avg_vision,
            avg_deaths,
            grades: StatGrades::new(avg_dmg, avg_vision, avg_deaths),
            champions: champion_stats(matches),
            tag_counts: tag_counts(matches),
        }
    }
}

/// Per-champion record, most played first, then by win rate.
fn champion_stats(matches: &[&AnalyzedMatch]) -> Vec<ChampionStat> {
    let mut order: Vec<&str> = Vec::new();
    let mut records: HashMap<&str, (u32, u32)> = HashMap::new();
    for m in matches {
        let champion = m.target.champion_name.as_str();
        let record = records.entry(champion).or_insert_with(|| {
            order.push(champion);
            (0, 0)
        });
        record.0 += 1;
        if m.result == MatchResult::Win {
            record.1 += 1;
        }
    }

    let mut stats: Vec<ChampionStat> = order
        .into_iter()
        .map(|champion| {
            let (games, wins) = records[champion];
            ChampionStat {
                champion_name: champion.to_string(),
                games,
                wins,
                win_rate: win_rate(wins, games),
            }
        })
        .collect();
    stats.sort_by(|a, b| b.games.cmp(&a.games).then(b.win_rate.cmp(&a.win_rate)));
    stats
}

/// How often each tag was earned, most frequent first.
fn tag_counts(matches: &[&AnalyzedMatch]) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    for tag in matches.iter().flat_map(|m| &m.target.tags) {
        match counts.iter_mut().find(|c| c.label == tag.label) {
            Some(count) => count.count += 1,
            None => counts.push(TagCount {
                label: tag.label,
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
