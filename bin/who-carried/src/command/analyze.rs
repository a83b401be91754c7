use crate::advisor::{advise_or_explain, match_prompt};
use crate::command::{Data, Options};
use crate::report::AnalysisReport;
use tracing::info;
use who_carried_evaluation::Identity;
use who_carried_riot::{MatchSource, Pacer};

/// Score a player's recent matches and summarize them.
#[tracing::instrument(skip(data))]
pub async fn analyze<S: MatchSource, P: Pacer>(
    data: &Data<S, P>,
    riot_id: &Identity,
    options: Options,
) -> anyhow::Result<String> {
    let Some(history) = data.fetch_history(riot_id).await? else {
        return Ok(format!("소환사 {riot_id}을(를) 찾을 수 없습니다."));
    };

    let analyzed =
        data.analyzer
            .analyze_all(&history.matches, &history.account.puuid, chrono::Utc::now());
    info!("Analyzed {} matches for {riot_id}", analyzed.len());

    let mut report = AnalysisReport::build(history.profile, options.queue, &analyzed);
    if options.advice && !report.matches.is_empty() {
        let player = format!("{}#{}", report.profile.game_name, report.profile.tag_line);
        let matches: Vec<_> = report.matches.iter().collect();
        let prompt = match_prompt(&player, &matches);
        report.advice = Some(advise_or_explain(&data.advisor, prompt).await);
    }

    if options.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(report.to_string())
    }
}
