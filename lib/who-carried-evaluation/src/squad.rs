use crate::analyzer::{AnalyzedMatch, SquadMemberPerformance};
use crate::identity::Identity;
use crate::label::{IdentityLabel, IdentityRules};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Running sums of breakdown terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BreakdownTotals {
    pub base: i64,
    pub vision: i64,
    pub dmg: i64,
    pub deaths: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SquadTotals {
    pub score: i64,
    pub kills: u64,
    pub deaths: u64,
    pub assists: u64,
    pub damage: u64,
    pub gold: u64,
    pub vision: u64,
    pub breakdown: BreakdownTotals,
}

impl SquadTotals {
    fn add(&mut self, performance: &SquadMemberPerformance) {
        self.score += i64::from(performance.score);
        self.kills += u64::from(performance.kills);
        self.deaths += u64::from(performance.deaths);
        self.assists += u64::from(performance.assists);
        self.damage += u64::from(performance.damage);
        self.gold += u64::from(performance.gold);
        self.vision += u64::from(performance.vision_score);
        self.breakdown.base += i64::from(performance.breakdown.base);
        self.breakdown.vision += i64::from(performance.breakdown.vision);
        self.breakdown.dmg += i64::from(performance.breakdown.dmg);
        self.breakdown.deaths += i64::from(performance.breakdown.deaths);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AverageBreakdown {
    pub base: f64,
    pub vision: f64,
    pub dmg: f64,
    pub deaths: f64,
}

/// One squad member's rollup over the matches the whole squad played.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadAggregate {
    pub identity: Identity,
    pub match_count: u32,
    pub totals: SquadTotals,
    /// Floored average score, the ranking key.
    pub avg_score: i64,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    pub avg_dmg: i64,
    pub avg_vision: f64,
    pub avg_breakdown: AverageBreakdown,
    /// Damage per gold, as a floored percentage.
    pub efficiency: i64,
}

impl SquadAggregate {
    fn new(identity: Identity, match_count: u32, totals: SquadTotals) -> Self {
        // Only built for identities seen at least once
        let games = i64::from(match_count.max(1));
        let per_game = |sum: u64| sum as f64 / games as f64;
        let per_game_signed = |sum: i64| sum as f64 / games as f64;

        Self {
            avg_score: totals.score.div_euclid(games),
            avg_kills: per_game(totals.kills),
            avg_deaths: per_game(totals.deaths),
            avg_assists: per_game(totals.assists),
            avg_dmg: (totals.damage / games as u64) as i64,
            avg_vision: per_game(totals.vision),
            avg_breakdown: AverageBreakdown {
                base: per_game_signed(totals.breakdown.base),
                vision: per_game_signed(totals.breakdown.vision),
                dmg: per_game_signed(totals.breakdown.dmg),
                deaths: per_game_signed(totals.breakdown.deaths),
            },
            efficiency: (totals.damage * 100 / totals.gold.max(1)) as i64,
            identity,
            match_count,
            totals,
        }
    }

    /// Per-game `kills/deaths/assists` with one decimal.
    pub fn avg_kda(&self) -> String {
        format!(
            "{:.1}/{:.1}/{:.1}",
            self.avg_kills, self.avg_deaths, self.avg_assists
        )
    }
}

fn unique_targets(targets: &[Identity]) -> HashSet<&Identity> {
    targets.iter().collect()
}

/// Matches in which every target identity played.
pub fn common_matches<'a>(
    matches: &'a [AnalyzedMatch],
    targets: &[Identity],
) -> Vec<&'a AnalyzedMatch> {
    let targets = unique_targets(targets);
    matches
        .iter()
        .filter(|m| m.contains_all(&targets))
        .collect()
}

/// Sum up every target's performances over `matches`. Each identity keeps its
/// own match count, in order of first appearance.
fn accumulate<'a>(
    matches: impl IntoIterator<Item = &'a AnalyzedMatch>,
    targets: &HashSet<&Identity>,
) -> Vec<SquadAggregate> {
    let mut order: Vec<Identity> = Vec::new();
    let mut sums: HashMap<Identity, (u32, SquadTotals)> = HashMap::new();

    for analyzed in matches {
        for performance in analyzed.members_of(targets) {
            let entry = sums.entry(performance.identity.clone()).or_insert_with(|| {
                order.push(performance.identity.clone());
                (0, SquadTotals::default())
            });
            entry.0 += 1;
            entry.1.add(performance);
        }
    }

    order
        .into_iter()
        .filter_map(|identity| {
            let (count, totals) = sums.remove(&identity)?;
            Some(SquadAggregate::new(identity, count, totals))
        })
        .collect()
}

/// Roll up the target identities over the matches they all played together,
/// sorted by average score (descending, stable).
pub fn aggregate_squad(matches: &[AnalyzedMatch], targets: &[Identity]) -> Vec<SquadAggregate> {
    let common = common_matches(matches, targets);
    debug!(
        "{} of {} matches contain the whole squad of {}",
        common.len(),
        matches.len(),
        targets.len()
    );

    let mut aggregates = accumulate(common, &unique_targets(targets));
    aggregates.sort_by(|a, b| b.avg_score.cmp(&a.avg_score));
    aggregates
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMember {
    /// 1-based.
    pub rank: usize,
    pub label: IdentityLabel,
    pub aggregate: SquadAggregate,
}

/// Attach rank and identity label to sorted aggregates.
pub fn rank_squad(aggregates: Vec<SquadAggregate>, rules: &IdentityRules) -> Vec<RankedMember> {
    let squad_size = aggregates.len();
    aggregates
        .into_iter()
        .enumerate()
        .map(|(i, aggregate)| RankedMember {
            rank: i + 1,
            label: rules.label(&aggregate, i + 1, squad_size),
            aggregate,
        })
        .collect()
}

/// Squad award cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SquadHighlights<'a> {
    pub heart: &'a RankedMember,
    pub value_monster: &'a RankedMember,
    pub slayer: &'a RankedMember,
    pub playmaker: &'a RankedMember,
    pub lighthouse: &'a RankedMember,
    pub gold_donor: &'a RankedMember,
    pub tax_thief: &'a RankedMember,
    pub telescope: &'a RankedMember,
    pub pacifist: &'a RankedMember,
    pub suspect: &'a RankedMember,
}

/// The earliest member for which `key` is greatest under `ordering`.
fn first_by<'a, K: PartialOrd>(
    ranked: &'a [RankedMember],
    key: impl Fn(&SquadAggregate) -> K,
    ordering: Ordering,
) -> Option<&'a RankedMember> {
    let mut best = ranked.first()?;
    for member in &ranked[1..] {
        if key(&member.aggregate).partial_cmp(&key(&best.aggregate)) == Some(ordering) {
            best = member;
        }
    }
    Some(best)
}

impl<'a> SquadHighlights<'a> {
    pub fn from_ranked(ranked: &'a [RankedMember]) -> Option<Self> {
        use Ordering::{Greater, Less};

        Some(Self {
            heart: ranked.first()?,
            value_monster: first_by(ranked, |a| a.efficiency, Greater)?,
            slayer: first_by(ranked, |a| a.avg_kills, Greater)?,
            playmaker: first_by(ranked, |a| a.avg_assists, Greater)?,
            lighthouse: first_by(ranked, |a| a.avg_vision, Greater)?,
            gold_donor: first_by(ranked, |a| a.avg_deaths, Greater)?,
            tax_thief: first_by(ranked, |a| a.efficiency, Less)?,
            telescope: first_by(ranked, |a| a.avg_vision, Less)?,
            pacifist: first_by(ranked, |a| a.avg_dmg, Less)?,
            suspect: ranked.last()?,
        })
    }
}
