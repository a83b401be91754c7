use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tokio::fs::read_to_string;
use who_carried_evaluation::label::{IdentityRules, SuspectRule};
use who_carried_evaluation::ScoringPolicy;
use who_carried_riot::PacingPolicy;

/// Thresholds used when labelling squads.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LabelRules {
    pub identity: IdentityRules,
    pub suspect: SuspectRule,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rgapi_key: String,
    pub platform: String,
    pub pacing: PacingPolicy,
    pub pacing_ms: u64,
    pub pacing_burst: u32,
    pub warmup_ms: u64,
    pub request_timeout_secs: u64,
    pub match_count: i32,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub scoring: ScoringPolicy,
    pub labels: LabelRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rgapi_key: String::new(),
            platform: "kr".to_string(),
            pacing: PacingPolicy::Fixed,
            pacing_ms: 50,
            pacing_burst: 10,
            warmup_ms: 500,
            request_timeout_secs: 10,
            match_count: 20,
            gemini_api_key: String::new(),
            gemini_model: "gemini-2.0-flash".to_string(),
            scoring: ScoringPolicy::default(),
            labels: LabelRules::default(),
        }
    }
}

impl Config {
    pub async fn load(path: Option<impl AsRef<Path>>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::load_file(path).await?,
            None => Default::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    async fn load_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply environment overrides on top of the file (or default) values.
    fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        self.rgapi_key = var("RGAPI_KEY").unwrap_or(self.rgapi_key);
        self.platform = var("PLATFORM").unwrap_or(self.platform);
        self.gemini_api_key = var("GEMINI_API_KEY").unwrap_or(self.gemini_api_key);
        if let Some(pacing_ms) = var("PACING_MS") {
            self.pacing_ms = pacing_ms
                .parse()
                .with_context(|| format!("PACING_MS should be numeric, got {pacing_ms:?}"))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use who_carried_evaluation::role::Role;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default().with_env(env(&[])).unwrap();
        assert_eq!(config.platform, "kr");
        assert_eq!(config.pacing, PacingPolicy::Fixed);
        assert_eq!(config.pacing_ms, 50);
        assert_eq!(config.match_count, 20);
        assert_eq!(config.labels.suspect, SuspectRule::default());
    }

    #[test]
    fn test_file_then_env() {
        let config: Config = toml::from_str(indoc! {r#"
            rgapi_key = "from-file"
            platform = "euw1"
            pacing = "token_bucket"
            pacing_ms = 120
            match_count = 40

            [scoring]
            win_bonus = 25

            [scoring.roles.SUP]
            death_multiplier = 1.5

            [labels.identity]
            carry_score = 125

            [labels.suspect]
            floor = 80
        "#})
        .unwrap();

        let config = config
            .with_env(env(&[("RGAPI_KEY", "from-env"), ("PACING_MS", "75")]))
            .unwrap();

        assert_eq!(config.rgapi_key, "from-env");
        assert_eq!(config.platform, "euw1");
        assert_eq!(config.pacing, PacingPolicy::TokenBucket);
        assert_eq!(config.pacing_ms, 75);
        assert_eq!(config.match_count, 40);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.scoring.win_bonus, 25);
        assert_eq!(config.scoring.roles[&Role::Sup].death_multiplier, 1.5);
        assert_eq!(config.labels.identity.carry_score, 125);
        assert_eq!(config.labels.identity.heavy_deaths, 10.0);
        assert_eq!(config.labels.suspect.floor, 80);
        assert_eq!(config.labels.suspect.min_gap, 30);
    }

    #[test]
    fn test_bad_pacing_env() {
        let result = Config::default().with_env(env(&[("PACING_MS", "fast")]));
        assert!(result.is_err());
    }
}
