use crate::participant::ParticipantStat;
use crate::role::Role;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Additive explanation of a score. The four terms always sum to
/// [`Score::raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// KDA term plus win bonus plus any role bonus (tanking).
    pub base: i32,
    pub vision: i32,
    pub dmg: i32,
    /// Always zero or negative.
    pub deaths: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.base + self.vision + self.dmg + self.deaths
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    /// Final score, clamped to the policy bounds.
    pub value: i32,
    /// Sum of the breakdown before clamping.
    pub raw: i32,
    pub kda_ratio: f64,
    pub breakdown: ScoreBreakdown,
}

/// Linear bonus `floor((stat - baseline) / per_point)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatWeight {
    pub baseline: f64,
    pub per_point: f64,
}

impl StatWeight {
    fn bonus(&self, stat: u32) -> i32 {
        ((stat as f64 - self.baseline) / self.per_point).floor() as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankingWeight {
    pub baseline: f64,
    pub per_point: f64,
    pub cap: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssistWeight {
    pub baseline: u32,
    pub multiplier: f64,
}

/// Coefficients applied on top of the universal KDA and win terms for one
/// role. Missing terms contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleWeights {
    pub death_multiplier: f64,
    /// Never negative.
    #[serde(default)]
    pub damage: Option<StatWeight>,
    /// May be negative below the baseline.
    #[serde(default)]
    pub vision: Option<StatWeight>,
    #[serde(default)]
    pub tanking: Option<TankingWeight>,
    /// Added to the damage term.
    #[serde(default)]
    pub assists: Option<AssistWeight>,
}

impl RoleWeights {
    /// Weights for participants without a known role.
    pub fn neutral() -> Self {
        Self {
            death_multiplier: 2.5,
            damage: None,
            vision: None,
            tanking: None,
            assists: None,
        }
    }

    fn damage_bonus(&self, damage: u32) -> i32 {
        self.damage.map_or(0, |w| w.bonus(damage).max(0))
    }

    fn vision_bonus(&self, vision: u32) -> i32 {
        self.vision.map_or(0, |w| w.bonus(vision))
    }

    fn tanking_bonus(&self, damage_taken: u32) -> i32 {
        match self.tanking {
            Some(w) if damage_taken as f64 > w.baseline => {
                (((damage_taken as f64 - w.baseline) / w.per_point).floor() as i32).min(w.cap)
            }
            _ => 0,
        }
    }

    fn assist_bonus(&self, assists: u32) -> i32 {
        match self.assists {
            Some(w) if assists > w.baseline => {
                ((assists - w.baseline) as f64 * w.multiplier).floor() as i32
            }
            _ => 0,
        }
    }

    fn death_penalty(&self, deaths: u32) -> i32 {
        (deaths as f64 * self.death_multiplier).floor() as i32
    }
}

/// The contribution-score policy: universal KDA and win terms, a per-role
/// coefficient table, and the clamp bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// KDA ratio for deathless games is `(kills + assists) * multiplier`.
    pub kda_fallback_multiplier: f64,
    pub kda_scale: f64,
    pub win_bonus: i32,
    pub min_score: i32,
    pub max_score: i32,
    pub neutral: RoleWeights,
    /// Roles given in configuration replace their default weights; the
    /// others keep theirs.
    #[serde(deserialize_with = "merge_roles")]
    pub roles: HashMap<Role, RoleWeights>,
}

fn merge_roles<'de, D>(deserializer: D) -> Result<HashMap<Role, RoleWeights>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = HashMap::<Role, RoleWeights>::deserialize(deserializer)?;
    let mut roles = ScoringPolicy::default().roles;
    roles.extend(overrides);
    Ok(roles)
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        let roles = HashMap::from([
            (
                Role::Adc,
                RoleWeights {
                    death_multiplier: 2.5,
                    damage: Some(StatWeight {
                        baseline: 10_000.0,
                        per_point: 800.0,
                    }),
                    vision: Some(StatWeight {
                        baseline: 10.0,
                        per_point: 4.0,
                    }),
                    tanking: None,
                    assists: None,
                },
            ),
            (
                Role::Mid,
                RoleWeights {
                    death_multiplier: 2.5,
                    damage: Some(StatWeight {
                        baseline: 10_000.0,
                        per_point: 900.0,
                    }),
                    vision: Some(StatWeight {
                        baseline: 12.0,
                        per_point: 3.0,
                    }),
                    tanking: None,
                    assists: None,
                },
            ),
            (
                Role::Top,
                RoleWeights {
                    death_multiplier: 1.5,
                    damage: Some(StatWeight {
                        baseline: 12_000.0,
                        per_point: 1_100.0,
                    }),
                    vision: Some(StatWeight {
                        baseline: 12.0,
                        per_point: 4.0,
                    }),
                    tanking: Some(TankingWeight {
                        baseline: 15_000.0,
                        per_point: 1_000.0,
                        cap: 25,
                    }),
                    assists: None,
                },
            ),
            (
                Role::Jng,
                RoleWeights {
                    death_multiplier: 2.5,
                    damage: Some(StatWeight {
                        baseline: 10_000.0,
                        per_point: 1_100.0,
                    }),
                    vision: Some(StatWeight {
                        baseline: 15.0,
                        per_point: 3.0,
                    }),
                    tanking: None,
                    assists: None,
                },
            ),
            (
                Role::Sup,
                RoleWeights {
                    death_multiplier: 1.5,
                    damage: Some(StatWeight {
                        baseline: 8_000.0,
                        per_point: 1_200.0,
                    }),
                    vision: Some(StatWeight {
                        baseline: 25.0,
                        per_point: 3.0,
                    }),
                    tanking: None,
                    assists: Some(AssistWeight {
                        baseline: 10,
                        multiplier: 1.5,
                    }),
                },
            ),
        ]);

        Self {
            kda_fallback_multiplier: 1.5,
            kda_scale: 40.0,
            win_bonus: 20,
            min_score: 5,
            max_score: 250,
            neutral: RoleWeights::neutral(),
            roles,
        }
    }
}

impl ScoringPolicy {
    pub fn kda_ratio(&self, stat: &ParticipantStat) -> f64 {
        let takedowns = (stat.kills + stat.assists) as f64;
        if stat.deaths == 0 {
            takedowns * self.kda_fallback_multiplier
        } else {
            takedowns / stat.deaths as f64
        }
    }

    pub fn weights(&self, stat: &ParticipantStat) -> &RoleWeights {
        stat.position
            .role()
            .and_then(|role| self.roles.get(&role))
            .unwrap_or(&self.neutral)
    }

    /// Score one participant. Total over all inputs.
    pub fn score(&self, stat: &ParticipantStat) -> Score {
        let kda_ratio = self.kda_ratio(stat);
        let weights = self.weights(stat);

        let mut base = (kda_ratio.sqrt() * self.kda_scale).floor() as i32;
        if stat.win {
            base += self.win_bonus;
        }
        base += weights.tanking_bonus(stat.total_damage_taken);

        let breakdown = ScoreBreakdown {
            base,
            vision: weights.vision_bonus(stat.vision_score),
            dmg: weights.damage_bonus(stat.total_damage_dealt_to_champions)
                + weights.assist_bonus(stat.assists),
            deaths: -weights.death_penalty(stat.deaths),
        };
        let raw = breakdown.total();

        Score {
            // Not `clamp`, which panics on a misconfigured min > max
            value: raw.max(self.min_score).min(self.max_score),
            raw,
            kda_ratio,
            breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Position;
    use pretty_assertions::assert_eq;

    fn stat(position: Position) -> ParticipantStat {
        ParticipantStat {
            position,
            ..Default::default()
        }
    }

    #[test]
    fn test_deathless_mid_carry() {
        let participant = ParticipantStat {
            kills: 10,
            deaths: 0,
            assists: 5,
            win: true,
            total_damage_dealt_to_champions: 20_000,
            vision_score: 20,
            ..stat(Position::Middle)
        };
        let score = ScoringPolicy::default().score(&participant);

        assert_eq!(score.kda_ratio, 22.5);
        assert_eq!(
            score.breakdown,
            ScoreBreakdown {
                base: 209,
                vision: 2,
                dmg: 11,
                deaths: 0,
            }
        );
        assert_eq!(score.value, 222);
    }

    #[test]
    fn test_feeding_support_hits_floor() {
        let participant = ParticipantStat {
            kills: 0,
            deaths: 8,
            assists: 2,
            total_damage_dealt_to_champions: 3_000,
            vision_score: 10,
            ..stat(Position::Utility)
        };
        let score = ScoringPolicy::default().score(&participant);

        assert_eq!(
            score.breakdown,
            ScoreBreakdown {
                base: 20,
                vision: -5,
                dmg: 0,
                deaths: -12,
            }
        );
        assert_eq!(score.raw, 3);
        assert_eq!(score.value, 5);
    }

    #[test]
    fn test_all_zero_is_finite_and_floored() {
        let policy = ScoringPolicy::default();
        for position in [
            Position::Top,
            Position::Jungle,
            Position::Middle,
            Position::Bottom,
            Position::Utility,
            Position::Unknown,
        ] {
            let score = policy.score(&stat(position));
            assert_eq!(score.kda_ratio, 0.0);
            assert!(score.value >= policy.min_score);
            assert!(score.value <= policy.max_score);
        }
    }

    #[test]
    fn test_extreme_input_hits_ceiling() {
        let participant = ParticipantStat {
            kills: 40,
            deaths: 0,
            assists: 40,
            win: true,
            total_damage_dealt_to_champions: 150_000,
            vision_score: 100,
            ..stat(Position::Bottom)
        };
        let score = ScoringPolicy::default().score(&participant);
        assert!(score.raw > 250);
        assert_eq!(score.value, 250);
    }

    #[test]
    fn test_breakdown_sums_to_raw() {
        let policy = ScoringPolicy::default();
        for (kills, deaths, assists, damage, taken, vision) in [
            (3, 7, 4, 9_000, 30_000, 14),
            (12, 2, 9, 35_000, 12_000, 31),
            (0, 12, 1, 2_000, 5_000, 0),
            (1, 3, 22, 10_000, 11_000, 80),
        ] {
            for position in [Position::Top, Position::Utility, Position::Jungle] {
                let participant = ParticipantStat {
                    kills,
                    deaths,
                    assists,
                    total_damage_dealt_to_champions: damage,
                    total_damage_taken: taken,
                    vision_score: vision,
                    ..stat(position)
                };
                let score = policy.score(&participant);
                assert_eq!(score.breakdown.total(), score.raw);
                assert_eq!(score.value, score.raw.clamp(5, 250));
            }
        }
    }

    #[test]
    fn test_top_tanking_bonus_is_capped() {
        let policy = ScoringPolicy::default();
        let tank = |taken| {
            policy
                .score(&ParticipantStat {
                    deaths: 1,
                    total_damage_taken: taken,
                    total_damage_dealt_to_champions: 12_000,
                    vision_score: 12,
                    ..stat(Position::Top)
                })
                .breakdown
                .base
        };
        // 15000 taken is not over the baseline
        assert_eq!(tank(15_000), 0);
        assert_eq!(tank(20_500), 5);
        assert_eq!(tank(90_000), 25);
    }

    #[test]
    fn test_support_assist_bonus_joins_damage_term() {
        let participant = ParticipantStat {
            deaths: 2,
            assists: 17,
            total_damage_dealt_to_champions: 10_400,
            vision_score: 25,
            ..stat(Position::Utility)
        };
        let score = ScoringPolicy::default().score(&participant);
        // floor(2400 / 1200) + floor(7 * 1.5)
        assert_eq!(score.breakdown.dmg, 2 + 10);
        assert_eq!(score.breakdown.deaths, -3);
    }

    #[test]
    fn test_unknown_position_is_neutral() {
        let participant = ParticipantStat {
            kills: 2,
            deaths: 2,
            assists: 2,
            total_damage_dealt_to_champions: 50_000,
            vision_score: 0,
            ..stat(Position::Unknown)
        };
        let score = ScoringPolicy::default().score(&participant);
        assert_eq!(score.breakdown.vision, 0);
        assert_eq!(score.breakdown.dmg, 0);
        assert_eq!(score.breakdown.deaths, -5);
    }

    #[test]
    fn test_policy_from_toml() {
        let policy: ScoringPolicy = toml::from_str(
            r#"
            win_bonus = 10
            max_score = 160

            [roles.SUP]
            death_multiplier = 1.0
            vision = { baseline = 20.0, per_point = 2.0 }
            "#,
        )
        .unwrap();

        assert_eq!(policy.win_bonus, 10);
        assert_eq!(policy.kda_fallback_multiplier, 1.5);
        assert_eq!(policy.roles.len(), 5);
        assert_eq!(policy.roles[&Role::Sup].death_multiplier, 1.0);
        assert_eq!(policy.roles[&Role::Sup].damage, None);
    }

    #[test]
    fn test_tuning_one_role_keeps_the_others() {
        let tuned: ScoringPolicy = toml::from_str(
            r#"
            [roles.SUP]
            death_multiplier = 1.0
            "#,
        )
        .unwrap();
        let top = ParticipantStat {
            deaths: 4,
            total_damage_dealt_to_champions: 23_000,
            vision_score: 24,
            ..stat(Position::Top)
        };

        let expected = ScoreBreakdown {
            base: 0,
            vision: 3,
            dmg: 10,
            deaths: -6,
        };
        assert_eq!(ScoringPolicy::default().score(&top).breakdown, expected);
        assert_eq!(tuned.score(&top).breakdown, expected);
        assert_eq!(tuned.roles[&Role::Top], ScoringPolicy::default().roles[&Role::Top]);
    }
}
