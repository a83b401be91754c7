use crate::config::LabelRules;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;
use who_carried_evaluation::label::{describe, MatchBadge};
use who_carried_evaluation::role::Role;
use who_carried_evaluation::squad::common_matches;
use who_carried_evaluation::summary::{HistorySummary, QueueFilter};
use who_carried_evaluation::{
    aggregate_squad, rank_squad, AnalyzedMatch, Identity, MatchResult, RankedMember, Recency,
    SquadHighlights, SquadMemberPerformance,
};
use who_carried_riot::SummonerProfile;

/// One player's profile and analyzed history under a queue filter.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub profile: SummonerProfile,
    pub queue: QueueFilter,
    pub summary: HistorySummary,
    pub matches: Vec<AnalyzedMatch>,
    pub advice: Option<String>,
}

impl AnalysisReport {
    pub fn build(profile: SummonerProfile, queue: QueueFilter, matches: &[AnalyzedMatch]) -> Self {
        let filtered = queue.apply(matches);
        let summary = HistorySummary::build(&filtered);
        Self {
            profile,
            queue,
            summary,
            matches: filtered.into_iter().cloned().collect(),
            advice: None,
        }
    }
}

fn result_label(result: MatchResult) -> &'static str {
    match result {
        MatchResult::Win => "승리",
        MatchResult::Lose => "패배",
    }
}

/// One side of a match, each player with their leading tag.
fn roster_line(players: &[&SquadMemberPerformance]) -> String {
    players
        .iter()
        .map(|p| {
            let mut entry = format!(
                "{} {} {} {}점",
                p.identity.game_name(),
                p.champion_name,
                p.kda(),
                p.score
            );
            if let Some(tag) = p.tags.first() {
                entry.push_str(&format!(" [{}]", tag.label));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

impl Display for AnalysisReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let profile = &self.profile;
        let summary = &self.summary;
        write!(
            f,
            "{}#{}  Lv.{}  {}",
            profile.game_name, profile.tag_line, profile.level, profile.tier
        )?;
        if profile.is_ranked() {
            write!(
                f,
                " {}LP  {}승 {}패 ({}%)",
                profile.league_points, profile.wins, profile.losses, profile.win_rate
            )?;
        }
        writeln!(f)?;

        if summary.match_count == 0 {
            return writeln!(f, "[{}] 분석할 경기가 없습니다.", self.queue);
        }

        writeln!(
            f,
            "[{}] 최근 {}경기  평균 {}점 ({})  KDA {:.2}  딜 {}  시야 {:.1}  데스 {:.1}",
            self.queue,
            summary.match_count,
            summary.avg_score,
            summary.tier,
            summary.avg_kda_ratio,
            summary.avg_dmg,
            summary.avg_vision,
            summary.avg_deaths
        )?;
        writeln!(
            f,
            "교전 능력 {}  시야 장악 {}  생존력 {}",
            summary.grades.combat, summary.grades.vision, summary.grades.survival
        )?;

        let champions: Vec<String> = summary
            .champions
            .iter()
            .map(|c| format!("{} {}판 {}%", c.champion_name, c.games, c.win_rate))
            .collect();
        writeln!(f, "챔피언: {}", champions.join(", "))?;

        if !summary.tag_counts.is_empty() {
            writeln!(f, "메달:")?;
            for tag in &summary.tag_counts {
                match describe(tag.label) {
                    Some(description) => {
                        writeln!(f, "  {} x{}  {description}", tag.label, tag.count)?
                    }
                    None => writeln!(f, "  {} x{}", tag.label, tag.count)?,
                }
            }
        }

        writeln!(f)?;
        for m in &self.matches {
            let target = &m.target;
            let tags: Vec<&str> = m.target.tags.iter().map(|t| t.label).collect();
            write!(
                f,
                "{:<8} {}  {} {}  {}  {}점",
                m.recency.to_string(),
                result_label(m.result),
                target.champion_name,
                target.role,
                target.kda(),
                target.score
            )?;
            if tags.is_empty() {
                writeln!(f)?;
            } else {
                writeln!(f, "  [{}]", tags.join(", "))?;
            }
            let (winners, losers) = m.roster();
            writeln!(f, "    승리 팀: {}", roster_line(&winners))?;
            writeln!(f, "    패배 팀: {}", roster_line(&losers))?;
        }

        if let Some(advice) = &self.advice {
            writeln!(f, "\n[AI 분석]\n{advice}")?;
        }
        Ok(())
    }
}

/// One squad member in one shared game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadGameMember {
    pub identity: Identity,
    pub champion_name: String,
    pub role: Role,
    pub kda: String,
    pub score: i32,
    pub badge: MatchBadge,
}

/// A game the whole squad played together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadGame {
    pub match_id: String,
    pub recency: Recency,
    pub result: MatchResult,
    pub members: Vec<SquadGameMember>,
    pub suspect: Option<Identity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SquadReport {
    pub queue: QueueFilter,
    pub squad: Vec<Identity>,
    pub ranked: Vec<RankedMember>,
    pub games: Vec<SquadGame>,
    pub advice: Option<String>,
}

impl SquadReport {
    /// `matches` are analyzed from one member's point of view; only the
    /// ones the whole squad played count.
    pub fn build(
        queue: QueueFilter,
        matches: &[AnalyzedMatch],
        squad: Vec<Identity>,
        rules: &LabelRules,
    ) -> Self {
        let filtered: Vec<AnalyzedMatch> = queue.apply(matches).into_iter().cloned().collect();
        let ranked = rank_squad(aggregate_squad(&filtered, &squad), &rules.identity);

        let members: HashSet<&Identity> = squad.iter().collect();
        let games = common_matches(&filtered, &squad)
            .into_iter()
            .map(|m| SquadGame {
                match_id: m.match_id.clone(),
                recency: m.recency,
                result: m.result,
                members: m
                    .members_of(&members)
                    .map(|p| SquadGameMember {
                        identity: p.identity.clone(),
                        champion_name: p.champion_name.clone(),
                        role: p.role,
                        kda: p.kda(),
                        score: p.score,
                        badge: MatchBadge::from_score(p.score),
                    })
                    .collect(),
                suspect: rules
                    .suspect
                    .detect(m.members_of(&members))
                    .map(|p| p.identity.clone()),
            })
            .collect();

        Self {
            queue,
            squad,
            ranked,
            games,
            advice: None,
        }
    }

    pub fn highlights(&self) -> Option<SquadHighlights<'_>> {
        SquadHighlights::from_ranked(&self.ranked)
    }

    /// JSON form, highlights included.
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct WithHighlights<'a> {
            #[serde(flatten)]
            report: &'a SquadReport,
            highlights: Option<SquadHighlights<'a>>,
        }

        serde_json::to_string_pretty(&WithHighlights {
            report: self,
            highlights: self.highlights(),
        })
    }
}

impl Display for SquadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.squad.iter().map(Identity::to_string).collect();
        writeln!(f, "스쿼드 [{}] {}", self.queue, names.join(", "))?;

        if self.games.is_empty() {
            return writeln!(f, "함께한 경기가 없습니다.");
        }
        writeln!(f, "함께한 경기 {}판\n", self.games.len())?;

        for member in &self.ranked {
            let a = &member.aggregate;
            writeln!(
                f,
                "#{} {}  {}  평균 {}점  KDA {}  딜효율 {}%  시야 {:.1}",
                member.rank,
                a.identity,
                member.label,
                a.avg_score,
                a.avg_kda(),
                a.efficiency,
                a.avg_vision
            )?;
        }

        if let Some(h) = self.highlights() {
            writeln!(f)?;
            let cards = [
                ("팀의 심장", h.heart),
                ("가성비 괴물", h.value_monster),
                ("학살자", h.slayer),
                ("마더 테레사", h.playmaker),
                ("협곡 등대", h.lighthouse),
                ("기부천사", h.gold_donor),
                ("세금 도둑", h.tax_thief),
                ("망원경", h.telescope),
                ("평화주의자", h.pacifist),
                ("범인(Suspect)", h.suspect),
            ];
            for (title, member) in cards {
                writeln!(f, "{title}: {}", member.aggregate.identity)?;
            }
        }

        writeln!(f)?;
        for game in &self.games {
            let members: Vec<String> = game
                .members
                .iter()
                .map(|m| {
                    format!(
                        "{} {} {} {}점({})",
                        m.identity.game_name(),
                        m.champion_name,
                        m.kda,
                        m.score,
                        m.badge
                    )
                })
                .collect();
            write!(
                f,
                "{:<8} {}  {}",
                game.recency.to_string(),
                result_label(game.result),
                members.join(" | ")
            )?;
            match &game.suspect {
                Some(suspect) => writeln!(f, "  범인: {}", suspect.game_name())?,
                None => writeln!(f)?,
            }
        }

        if let Some(advice) = &self.advice {
            writeln!(f, "\n[AI 분석]\n{advice}")?;
        }
        Ok(())
    }
}
