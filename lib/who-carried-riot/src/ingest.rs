use crate::error::SourceError;
use crate::pacing::Pacer;
use crate::profile::SummonerProfile;
use crate::source::{Account, MatchSource};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use who_carried_evaluation::RawMatch;

// Riot's match list endpoint accepts at most 100
const MAX_MATCHES: i32 = 100;

/// Everything fetched for one player.
#[derive(Debug, Clone)]
pub struct PlayerHistory {
    pub account: Account,
    pub profile: SummonerProfile,
    /// Most recent first. Matches that failed to load are left out.
    pub matches: Vec<RawMatch>,
}

/// Walks account, summoner, league, match list and match details for a
/// player, one request at a time, pacing before every request after the
/// first.
#[derive(Debug)]
pub struct Ingestor<S, P> {
    source: S,
    pacer: P,
    match_count: i32,
    warmup: Duration,
}

impl<S: MatchSource, P: Pacer> Ingestor<S, P> {
    pub fn new(source: S, pacer: P) -> Self {
        Self {
            source,
            pacer,
            match_count: 20,
            warmup: Duration::ZERO,
        }
    }

    /// Number of recent matches to fetch, clamped to 1..=100.
    pub fn with_match_count(mut self, match_count: i32) -> Self {
        self.match_count = match_count.clamp(1, MAX_MATCHES);
        self
    }

    /// Extra delay before the match list is requested, taken through
    /// [`Pacer::hold`].
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch a player's profile and recent matches. `Ok(None)` means the
    /// account or summoner does not exist.
    ///
    /// A failed league lookup degrades to an unranked profile. A failed match
    /// detail is logged and skipped. Any other failure is returned.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_history(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<PlayerHistory>, SourceError> {
        let Some(account) = self.source.account(game_name, tag_line).await? else {
            info!("No account for {game_name}#{tag_line}");
            return Ok(None);
        };

        self.pacer.pace().await;
        let Some(summoner) = self.source.summoner(&account.puuid).await? else {
            info!("No summoner for {game_name}#{tag_line}");
            return Ok(None);
        };

        self.pacer.pace().await;
        let entries = match self.source.league_entries(&account.puuid).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("League lookup failed, treating {game_name}#{tag_line} as unranked: {e}");
                Vec::new()
            }
        };
        let profile = SummonerProfile::new(&account, &summoner, &entries);
        debug!("Profile: {profile:?}");

        if !self.warmup.is_zero() {
            self.pacer.hold(self.warmup).await;
        }
        self.pacer.pace().await;
        let match_ids = self
            .source
            .match_ids(&account.puuid, self.match_count)
            .await?;
        debug!("Got {} match IDs", match_ids.len());

        let matches = self.fetch_matches(&match_ids).await;
        Ok(Some(PlayerHistory {
            account,
            profile,
            matches,
        }))
    }

    /// Fetch match details strictly one after another, in the given order.
    pub async fn fetch_matches(&self, match_ids: &[String]) -> Vec<RawMatch> {
        let mut matches = Vec::with_capacity(match_ids.len());
        for match_id in match_ids {
            self.pacer.pace().await;
            match self.source.match_detail(match_id).await {
                Ok(Some(raw)) => matches.push(raw),
                Ok(None) => warn!("Match {match_id} not found, skipping"),
                Err(e) => error!("Failed to fetch match {match_id}, skipping: {e}"),
            }
        }
        matches
    }
}
