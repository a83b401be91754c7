use crate::analyzer::SquadMemberPerformance;
use crate::role::Role;
use crate::squad::SquadAggregate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TagKind {
    #[serde(rename = "KDA")]
    Kda,
    Dmg,
    Vision,
    Survival,
}

/// A badge attached to a single-game performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub kind: TagKind,
    pub label: &'static str,
}

struct TagRule {
    kind: TagKind,
    label: &'static str,
    description: &'static str,
    applies: fn(&SquadMemberPerformance) -> bool,
}

const MATCH_TAG_RULES: [TagRule; 11] = [
    TagRule {
        kind: TagKind::Kda,
        label: "불사신",
        description: "KDA 비율이 8 이상 (압도적 생존력)",
        applies: |p| p.kda_ratio >= 8.0,
    },
    TagRule {
        kind: TagKind::Dmg,
        label: "학살자",
        description: "10킬 이상 기록 (공포의 살육자)",
        applies: |p| p.kills >= 10,
    },
    TagRule {
        kind: TagKind::Kda,
        label: "어시왕",
        description: "15어시스트 이상 기록 (최고의 서포팅)",
        applies: |p| p.assists >= 15,
    },
    TagRule {
        kind: TagKind::Dmg,
        label: "파괴전차",
        description: "가한 피해량 40,000 초과 (팀 내 최강 딜러)",
        applies: |p| p.damage > 40_000,
    },
    TagRule {
        kind: TagKind::Vision,
        label: "맵핵",
        description: "시야 점수 60 초과 (맵의 지배자)",
        applies: |p| p.vision_score > 60,
    },
    TagRule {
        kind: TagKind::Survival,
        label: "기부천사",
        description: "10데스 이상 기록 (분발이 필요합니다)",
        applies: |p| p.deaths >= 10,
    },
    TagRule {
        kind: TagKind::Kda,
        label: "하드캐리",
        description: "기여도 점수 135점 이상 (승리의 일등공신)",
        applies: |p| p.score >= 135,
    },
    TagRule {
        kind: TagKind::Survival,
        label: "완벽주의자",
        description: "1킬 이상 기록 및 노데스로 종료",
        applies: |p| p.kills >= 1 && p.deaths == 0,
    },
    TagRule {
        kind: TagKind::Kda,
        label: "동에번쩍",
        description: "킬 관여율이 매우 높음",
        applies: |p| p.kills + p.assists >= 25,
    },
    TagRule {
        kind: TagKind::Dmg,
        label: "관광객",
        description: "딜러임에도 딜량이 매우 낮음",
        applies: |p| p.damage < 5_000 && p.role != Role::Sup,
    },
    TagRule {
        kind: TagKind::Vision,
        label: "리신",
        description: "서포터임에도 시야 기여가 전무함",
        applies: |p| p.vision_score < 5 && p.role == Role::Sup,
    },
];

/// Deduplicate tags by label. The first tag with a given label wins and
/// the original order is kept.
pub fn collect_tags(tags: impl IntoIterator<Item = Tag>) -> Vec<Tag> {
    let mut seen = HashSet::new();
    tags.into_iter().filter(|tag| seen.insert(tag.label)).collect()
}

/// All threshold tags that apply to one performance.
pub fn match_tags(performance: &SquadMemberPerformance) -> Vec<Tag> {
    collect_tags(
        MATCH_TAG_RULES
            .iter()
            .filter(|rule| (rule.applies)(performance))
            .map(|rule| Tag {
                kind: rule.kind,
                label: rule.label,
            }),
    )
}

pub fn describe(label: &str) -> Option<&'static str> {
    MATCH_TAG_RULES
        .iter()
        .find(|rule| rule.label == label)
        .map(|rule| rule.description)
}

/// Identity of a squad member over the games the squad played together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityLabel {
    God,
    SteadyAnchor,
    WinDriver,
    GoldDonor,
    TaxThief,
    Telescope,
    Suspect,
    KillStealer,
    Playmaker,
    ValueMonster,
    AverageCitizen,
}

impl IdentityLabel {
    pub fn label(&self) -> &'static str {
        match self {
            IdentityLabel::God => "신(GOD)",
            IdentityLabel::SteadyAnchor => "묵묵한 버팀목",
            IdentityLabel::WinDriver => "승리 견인차",
            IdentityLabel::GoldDonor => "300원 맛집",
            IdentityLabel::TaxThief => "세금 도둑",
            IdentityLabel::Telescope => "망원경",
            IdentityLabel::Suspect => "지명수배자",
            IdentityLabel::KillStealer => "킬 스틸러",
            IdentityLabel::Playmaker => "마더 테레사",
            IdentityLabel::ValueMonster => "가성비 괴물",
            IdentityLabel::AverageCitizen => "평범한 시민",
        }
    }
}

impl Display for IdentityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Thresholds of the squad identity decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityRules {
    pub carry_score: i64,
    pub heavy_deaths: f64,
    pub inefficient_below: i64,
    pub vision_blind_below: f64,
    pub kill_stealer_kills_over: f64,
    pub kill_stealer_assists_below: f64,
    pub playmaker_assists_over: f64,
    pub value_monster_over: i64,
}

impl Default for IdentityRules {
    fn default() -> Self {
        Self {
            carry_score: 115,
            heavy_deaths: 10.0,
            inefficient_below: 40,
            vision_blind_below: 8.0,
            kill_stealer_kills_over: 8.0,
            kill_stealer_assists_below: 5.0,
            playmaker_assists_over: 15.0,
            value_monster_over: 120,
        }
    }
}

impl IdentityRules {
    /// Label one member. `rank` is 1-based; the first rule that matches wins.
    pub fn label(&self, member: &SquadAggregate, rank: usize, squad_size: usize) -> IdentityLabel {
        let is_last = rank == squad_size;

        if rank == 1 {
            return IdentityLabel::God;
        }
        if member.avg_score >= self.carry_score {
            return if is_last {
                IdentityLabel::SteadyAnchor
            } else {
                IdentityLabel::WinDriver
            };
        }
        if member.avg_deaths >= self.heavy_deaths {
            return IdentityLabel::GoldDonor;
        }
        if member.efficiency < self.inefficient_below {
            return IdentityLabel::TaxThief;
        }
        if member.avg_vision < self.vision_blind_below {
            return IdentityLabel::Telescope;
        }
        if is_last {
            return IdentityLabel::Suspect;
        }
        if member.avg_kills > self.kill_stealer_kills_over
            && member.avg_assists < self.kill_stealer_assists_below
        {
            return IdentityLabel::KillStealer;
        }
        if member.avg_assists > self.playmaker_assists_over {
            return IdentityLabel::Playmaker;
        }
        if member.efficiency > self.value_monster_over {
            return IdentityLabel::ValueMonster;
        }
        IdentityLabel::AverageCitizen
    }
}

/// Flags the weakest squad member of one match, if they fell clearly behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspectRule {
    /// Lowest score must be strictly below this.
    pub floor: i32,
    /// Highest minus lowest must be at least this.
    pub min_gap: i32,
}

impl Default for SuspectRule {
    fn default() -> Self {
        Self {
            floor: 85,
            min_gap: 30,
        }
    }
}

impl SuspectRule {
    pub fn detect<'a>(
        &self,
        members: impl IntoIterator<Item = &'a SquadMemberPerformance>,
    ) -> Option<&'a SquadMemberPerformance> {
        let mut members: Vec<&SquadMemberPerformance> = members.into_iter().collect();
        members.sort_by_key(|member| member.score);

        let lowest = *members.first()?;
        let highest = *members.last()?;
        (lowest.score < self.floor && highest.score - lowest.score >= self.min_gap)
            .then_some(lowest)
    }
}

/// Ladder for an average score over a match history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Troll,
    Invisible,
    BusPassenger,
    Decent,
    OnePerson,
    Ace,
    Carry,
    God,
}

impl ScoreTier {
    pub fn from_score(score: i64) -> Self {
        match score {
            140.. => ScoreTier::God,
            120..=139 => ScoreTier::Carry,
            110..=119 => ScoreTier::Ace,
            100..=109 => ScoreTier::OnePerson,
            90..=99 => ScoreTier::Decent,
            80..=89 => ScoreTier::BusPassenger,
            70..=79 => ScoreTier::Invisible,
            _ => ScoreTier::Troll,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::God => "신(GOD)",
            ScoreTier::Carry => "CARRY",
            ScoreTier::Ace => "에이스",
            ScoreTier::OnePerson => "1인분",
            ScoreTier::Decent => "준수함",
            ScoreTier::BusPassenger => "버스승객",
            ScoreTier::Invisible => "무존재감",
            ScoreTier::Troll => "트롤",
        }
    }
}

impl Display for ScoreTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Badge for one squad member's single game in a squad report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBadge {
    HardCarry,
    Ace,
    OnePerson,
    Passenger,
}

impl MatchBadge {
    pub fn from_score(score: i32) -> Self {
        match score {
            135.. => MatchBadge::HardCarry,
            115..=134 => MatchBadge::Ace,
            95..=114 => MatchBadge::OnePerson,
            _ => MatchBadge::Passenger,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchBadge::HardCarry => "하드캐리",
            MatchBadge::Ace => "ACE",
            MatchBadge::OnePerson => "1인분",
            MatchBadge::Passenger => "버스 승객",
        }
    }
}

impl Display for MatchBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::score::ScoreBreakdown;
    use crate::squad::SquadTotals;
    use pretty_assertions::assert_eq;

    fn performance(name: &str, score: i32) -> SquadMemberPerformance {
        SquadMemberPerformance {
            identity: Identity::new(name, "KR1"),
            puuid: format!("puuid-{name}"),
            champion_name: "Garen".into(),
            role: Role::Top,
            score,
            breakdown: ScoreBreakdown::default(),
            kda_ratio: 2.0,
            kills: 4,
            deaths: 4,
            assists: 4,
            damage: 15_000,
            gold: 10_000,
            vision_score: 15,
            win: true,
            tags: Vec::new(),
        }
    }

    fn labels(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(|tag| tag.label).collect()
    }

    fn aggregate(avg_score: i64) -> SquadAggregate {
        SquadAggregate {
            identity: Identity::new("member", "KR1"),
            match_count: 1,
            totals: SquadTotals::default(),
            avg_score,
            avg_kills: 5.0,
            avg_deaths: 5.0,
            avg_assists: 8.0,
            avg_dmg: 15_000,
            avg_vision: 20.0,
            avg_breakdown: Default::default(),
            efficiency: 100,
        }
    }

    #[test]
    fn test_match_tags_thresholds() {
        let perfect = SquadMemberPerformance {
            kills: 12,
            deaths: 0,
            assists: 15,
            kda_ratio: 40.5,
            damage: 45_000,
            score: 200,
            ..performance("a", 0)
        };
        assert_eq!(
            labels(&match_tags(&perfect)),
            ["불사신", "학살자", "어시왕", "파괴전차", "하드캐리", "완벽주의자", "동에번쩍"]
        );

        let feeder = SquadMemberPerformance {
            kills: 0,
            deaths: 10,
            damage: 4_999,
            kda_ratio: 0.1,
            ..performance("b", 5)
        };
        assert_eq!(labels(&match_tags(&feeder)), ["기부천사", "관광객"]);

        let blind_support = SquadMemberPerformance {
            role: Role::Sup,
            damage: 1_000,
            vision_score: 4,
            ..performance("c", 50)
        };
        assert_eq!(labels(&match_tags(&blind_support)), ["리신"]);
        assert!(match_tags(&performance("d", 100)).is_empty());
    }

    #[test]
    fn test_duplicate_labels_first_wins() {
        let tags = collect_tags([
            Tag {
                kind: TagKind::Kda,
                label: "하드캐리",
            },
            Tag {
                kind: TagKind::Dmg,
                label: "맵핵",
            },
            Tag {
                kind: TagKind::Dmg,
                label: "하드캐리",
            },
        ]);
        assert_eq!(labels(&tags), ["하드캐리", "맵핵"]);
        assert_eq!(tags[0].kind, TagKind::Kda);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe("리신"), Some("서포터임에도 시야 기여가 전무함"));
        assert_eq!(describe("없음"), None);
    }

    #[test]
    fn test_identity_label_priority() {
        let rules = IdentityRules::default();

        assert_eq!(rules.label(&aggregate(10), 1, 3), IdentityLabel::God);
        assert_eq!(rules.label(&aggregate(130), 2, 3), IdentityLabel::WinDriver);
        assert_eq!(rules.label(&aggregate(115), 3, 3), IdentityLabel::SteadyAnchor);

        // Heavy deaths outranks the last-place suspect label
        let donor = SquadAggregate {
            avg_deaths: 10.0,
            ..aggregate(60)
        };
        assert_eq!(rules.label(&donor, 3, 3), IdentityLabel::GoldDonor);

        let thief = SquadAggregate {
            efficiency: 39,
            avg_vision: 2.0,
            ..aggregate(90)
        };
        assert_eq!(rules.label(&thief, 2, 3), IdentityLabel::TaxThief);

        let blind = SquadAggregate {
            avg_vision: 7.9,
            ..aggregate(90)
        };
        assert_eq!(rules.label(&blind, 2, 3), IdentityLabel::Telescope);

        let stealer = SquadAggregate {
            avg_kills: 9.0,
            avg_assists: 4.0,
            ..aggregate(90)
        };
        assert_eq!(rules.label(&stealer, 2, 3), IdentityLabel::KillStealer);
        assert_eq!(rules.label(&stealer, 3, 3), IdentityLabel::Suspect);

        let playmaker = SquadAggregate {
            avg_assists: 16.0,
            efficiency: 150,
            ..aggregate(90)
        };
        assert_eq!(rules.label(&playmaker, 2, 3), IdentityLabel::Playmaker);

        let value = SquadAggregate {
            efficiency: 121,
            ..aggregate(90)
        };
        assert_eq!(rules.label(&value, 2, 3), IdentityLabel::ValueMonster);
        assert_eq!(
            rules.label(&aggregate(90), 2, 3),
            IdentityLabel::AverageCitizen
        );
    }

    #[test]
    fn test_suspect_requires_floor_and_gap() {
        let rule = SuspectRule::default();

        let squad = [performance("a", 120), performance("b", 84), performance("c", 100)];
        assert_eq!(
            rule.detect(&squad).map(|p| p.identity.game_name()),
            Some("b")
        );

        // Uniformly mediocre: below the floor but within 29 points
        let mediocre = [performance("a", 60), performance("b", 89), performance("c", 70)];
        assert!(rule.detect(&mediocre).is_none());

        // Big gap but the lowest is not below the floor
        let strong = [performance("a", 85), performance("b", 200)];
        assert!(rule.detect(&strong).is_none());

        assert!(rule.detect(std::iter::empty()).is_none());
        assert!(rule.detect(&[performance("solo", 10)]).is_none());
    }

    #[test]
    fn test_score_tier_and_badge() {
        assert_eq!(ScoreTier::from_score(140), ScoreTier::God);
        assert_eq!(ScoreTier::from_score(139), ScoreTier::Carry);
        assert_eq!(ScoreTier::from_score(100), ScoreTier::OnePerson);
        assert_eq!(ScoreTier::from_score(70), ScoreTier::Invisible);
        assert_eq!(ScoreTier::from_score(69), ScoreTier::Troll);
        assert_eq!(ScoreTier::from_score(-3), ScoreTier::Troll);

        assert_eq!(MatchBadge::from_score(135), MatchBadge::HardCarry);
        assert_eq!(MatchBadge::from_score(115), MatchBadge::Ace);
        assert_eq!(MatchBadge::from_score(95), MatchBadge::OnePerson);
        assert_eq!(MatchBadge::from_score(94).label(), "버스 승객");
    }
}
