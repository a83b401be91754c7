use crate::advisor::GeminiAdvisor;
use crate::config::{Config, LabelRules};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use riven::{RiotApi, RiotApiConfig};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use who_carried_evaluation::summary::QueueFilter;
use who_carried_evaluation::{Identity, MatchAnalyzer};
use who_carried_riot::{
    platform_route, AnyPacer, Ingestor, MatchSource, Pacer, PlayerHistory, RiotSource,
};

mod analyze;
mod squad;

pub use analyze::analyze;
pub use squad::squad;

/// Flags shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub queue: QueueFilter,
    pub json: bool,
    pub advice: bool,
}

/// The Riot API refused the request for now.
#[derive(Debug, Error)]
#[error("요청 초과. 잠시 후 다시 시도해 주세요. ({endpoint})")]
pub struct RateLimited {
    pub endpoint: &'static str,
}

pub struct Data<S = RiotSource, P = AnyPacer> {
    pub ingestor: Ingestor<S, P>,
    pub analyzer: MatchAnalyzer,
    pub labels: LabelRules,
    pub advisor: GeminiAdvisor,
}

impl Data {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        anyhow::ensure!(!config.rgapi_key.is_empty(), "RGAPI_KEY is not set");
        let platform = platform_route(&config.platform)
            .with_context(|| format!("Unknown platform {:?}", config.platform))?;
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let mut headers = HeaderMap::new();
        headers.insert(
            RiotApiConfig::RIOT_KEY_HEADER,
            HeaderValue::from_str(&config.rgapi_key).context("RGAPI_KEY is not a valid header")?,
        );
        let client_builder = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .timeout(timeout);
        let riot_api = Arc::new(RiotApi::new(RiotApiConfig::with_client_builder(
            client_builder,
        )));

        let pacer = AnyPacer::new(
            config.pacing,
            Duration::from_millis(config.pacing_ms),
            config.pacing_burst,
        );
        let ingestor = Ingestor::new(RiotSource::new(riot_api, platform), pacer)
            .with_match_count(config.match_count)
            .with_warmup(Duration::from_millis(config.warmup_ms));

        let advisor = GeminiAdvisor::new(config.gemini_api_key, config.gemini_model, timeout)
            .context("Failed to build advisory client")?;

        Ok(Self {
            ingestor,
            analyzer: MatchAnalyzer::new(config.scoring),
            labels: config.labels,
            advisor,
        })
    }
}

impl<S: MatchSource, P: Pacer> Data<S, P> {
    /// Fetch a player's history. A rate limit comes back as [`RateLimited`]
    /// so the caller can tell it apart from other failures.
    async fn fetch_history(&self, identity: &Identity) -> anyhow::Result<Option<PlayerHistory>> {
        match self
            .ingestor
            .fetch_history(identity.game_name(), identity.tag_line())
            .await
        {
            Err(e) if e.is_rate_limited() => {
                warn!("Rate limited while fetching {identity}: {e}");
                Err(RateLimited {
                    endpoint: e.endpoint(),
                }
                .into())
            }
            result => result.context("Failed to fetch match history"),
        }
    }
}
